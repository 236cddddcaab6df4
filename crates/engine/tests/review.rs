use chrono::{NaiveDate, Utc};

use engine::{
    Category, DraftGroup, DraftRow, EngineError, Expense, ExpenseListFilter, ExpenseStatus,
    ExpenseUpdate, Money,
};

mod common;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

async fn submit_one(ctx: &common::TestContext, amount: &str) -> Expense {
    let drafts = vec![DraftGroup {
        category: Category::Travel,
        rows: vec![DraftRow {
            description: "taxi".to_string(),
            amount: amount.to_string(),
            image_url: None,
        }],
    }];
    ctx.engine
        .submit_expenses(&ctx.user, day(), None, &drafts, Utc::now())
        .await
        .unwrap()
        .remove(0)
}

#[tokio::test]
async fn approve_with_corrected_amount() {
    let ctx = common::setup().await;
    let submitted = submit_one(&ctx, "500").await;
    assert_eq!(submitted.amount, Money::new(500_00));

    let approved = ctx
        .engine
        .approve_expense(
            &ctx.admin,
            submitted.id,
            Some(Money::new(450_00)),
            Some("receipt shows 450"),
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(approved.status, ExpenseStatus::Approved);
    assert_eq!(approved.amount, Money::new(450_00));
    assert_eq!(approved.approved_by, Some(ctx.admin.user_id));
    assert!(approved.approved_at.is_some());
    assert_eq!(approved.admin_note.as_deref(), Some("receipt shows 450"));
}

#[tokio::test]
async fn reject_without_reason_is_a_no_op() {
    let ctx = common::setup().await;
    let submitted = submit_one(&ctx, "200").await;

    let err = ctx
        .engine
        .reject_expense(&ctx.admin, submitted.id, "   ", Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MissingReason);

    let listed = ctx
        .engine
        .list_expenses(&ctx.user, &Default::default())
        .await
        .unwrap();
    assert_eq!(listed[0].status, ExpenseStatus::Pending);
    assert_eq!(listed[0].rejected_reason, None);
}

#[tokio::test]
async fn reject_then_approve_reverts_the_decision() {
    let ctx = common::setup().await;
    let submitted = submit_one(&ctx, "200").await;

    let rejected = ctx
        .engine
        .reject_expense(&ctx.admin, submitted.id, "no receipt", Utc::now())
        .await
        .unwrap();
    assert_eq!(rejected.status, ExpenseStatus::Rejected);
    assert_eq!(rejected.rejected_reason.as_deref(), Some("no receipt"));

    let approved = ctx
        .engine
        .approve_expense(&ctx.admin, submitted.id, None, None, Utc::now())
        .await
        .unwrap();
    assert_eq!(approved.status, ExpenseStatus::Approved);
    assert_eq!(approved.rejected_reason, None);
}

#[tokio::test]
async fn owner_edit_locked_after_approval() {
    let ctx = common::setup().await;
    let submitted = submit_one(&ctx, "200").await;

    // Editable while pending.
    let (edited, superseded) = ctx
        .engine
        .update_expense(
            &ctx.user,
            submitted.id,
            ExpenseUpdate {
                amount: Some(Money::new(250_00)),
                image_url: Some("receipts/a.jpg".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(edited.amount, Money::new(250_00));
    assert_eq!(superseded, None);

    ctx.engine
        .approve_expense(&ctx.admin, submitted.id, None, None, Utc::now())
        .await
        .unwrap();

    let err = ctx
        .engine
        .update_expense(
            &ctx.user,
            submitted.id,
            ExpenseUpdate {
                amount: Some(Money::new(300_00)),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotEditable(_)));
}

#[tokio::test]
async fn replacing_a_receipt_reports_the_superseded_url() {
    let ctx = common::setup().await;
    let submitted = submit_one(&ctx, "200").await;

    ctx.engine
        .update_expense(
            &ctx.user,
            submitted.id,
            ExpenseUpdate {
                image_url: Some("receipts/old.jpg".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();

    let (_, superseded) = ctx
        .engine
        .update_expense(
            &ctx.user,
            submitted.id,
            ExpenseUpdate {
                image_url: Some("receipts/new.jpg".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(superseded.as_deref(), Some("receipts/old.jpg"));
}

#[tokio::test]
async fn review_requires_admin() {
    let ctx = common::setup().await;
    let submitted = submit_one(&ctx, "200").await;

    let err = ctx
        .engine
        .approve_expense(&ctx.user, submitted.id, None, None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = ctx
        .engine
        .delete_expense(&ctx.user, submitted.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn report_rows_reject_an_inverted_date_range() {
    let ctx = common::setup().await;
    submit_one(&ctx, "200").await;

    let filter = ExpenseListFilter {
        from: Some(day()),
        to: Some(day()),
        ..Default::default()
    };
    let err = ctx
        .engine
        .report_rows(&ctx.admin, &filter)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    // Same predicate as listing, so a well-formed range exports the row.
    let filter = ExpenseListFilter {
        from: Some(day()),
        to: day().succ_opt(),
        ..Default::default()
    };
    let rows = ctx.engine.report_rows(&ctx.admin, &filter).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, Money::new(200_00));
}

#[tokio::test]
async fn admin_hard_delete_returns_receipt_url() {
    let ctx = common::setup().await;
    let submitted = submit_one(&ctx, "200").await;
    ctx.engine
        .update_expense(
            &ctx.user,
            submitted.id,
            ExpenseUpdate {
                image_url: Some("receipts/gone.jpg".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();

    let orphaned = ctx
        .engine
        .delete_expense(&ctx.admin, submitted.id)
        .await
        .unwrap();
    assert_eq!(orphaned.as_deref(), Some("receipts/gone.jpg"));

    let listed = ctx
        .engine
        .list_expenses(&ctx.user, &Default::default())
        .await
        .unwrap();
    assert!(listed.is_empty());
}
