use chrono::{NaiveDate, Utc};

use engine::{
    Category, DraftGroup, DraftRow, EngineError, ExpenseListFilter, ExpenseStatus, Money, Role,
};

mod common;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

async fn submit_and_approve(ctx: &common::TestContext, category: Category, amount: &str) {
    let drafts = vec![DraftGroup {
        category,
        rows: vec![DraftRow {
            description: "entry".to_string(),
            amount: amount.to_string(),
            image_url: None,
        }],
    }];
    let created = ctx
        .engine
        .submit_expenses(&ctx.user, day(), None, &drafts, Utc::now())
        .await
        .unwrap();
    ctx.engine
        .approve_expense(&ctx.admin, created[0].id, None, None, Utc::now())
        .await
        .unwrap();
}

#[tokio::test]
async fn balance_reflects_spend_minus_settlements() {
    let ctx = common::setup().await;
    submit_and_approve(&ctx, Category::Travel, "1200").await;
    submit_and_approve(&ctx, Category::Meal, "800").await;

    ctx.engine
        .record_settlement(
            &ctx.admin,
            ctx.user.user_id,
            None,
            Money::new(1500_00),
            "upi/txn-991.png",
            None,
            false,
            Utc::now(),
        )
        .await
        .unwrap();

    let summary = ctx.engine.user_balance(&ctx.user, None).await.unwrap();
    assert_eq!(summary.spent, Money::new(2000_00));
    assert_eq!(summary.received, Money::new(1500_00));
    assert_eq!(summary.balance, Money::new(-500_00));
}

#[tokio::test]
async fn full_settlement_marks_approved_entries_settled() {
    let ctx = common::setup().await;
    submit_and_approve(&ctx, Category::Travel, "700").await;
    submit_and_approve(&ctx, Category::Hotel, "1300").await;

    ctx.engine
        .record_settlement(
            &ctx.admin,
            ctx.user.user_id,
            None,
            Money::new(2000_00),
            "upi/txn-992.png",
            Some("pay full"),
            true,
            Utc::now(),
        )
        .await
        .unwrap();

    let listed = ctx
        .engine
        .list_expenses(&ctx.user, &ExpenseListFilter::default())
        .await
        .unwrap();
    assert!(listed.iter().all(|e| e.status == ExpenseStatus::Settled));

    // Settled entries still count as spend, so the balance stays even.
    let summary = ctx.engine.user_balance(&ctx.user, None).await.unwrap();
    assert_eq!(summary.balance, Money::ZERO);
}

#[tokio::test]
async fn settlement_requires_admin_and_proof() {
    let ctx = common::setup().await;

    let err = ctx
        .engine
        .record_settlement(
            &ctx.user,
            ctx.user.user_id,
            None,
            Money::new(100_00),
            "proof.png",
            None,
            false,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = ctx
        .engine
        .record_settlement(
            &ctx.admin,
            ctx.user.user_id,
            None,
            Money::new(100_00),
            "  ",
            None,
            false,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MissingField("settlement proof".to_string()));
}

#[tokio::test]
async fn owner_acknowledges_a_settlement() {
    let ctx = common::setup().await;
    let settlement = ctx
        .engine
        .record_settlement(
            &ctx.admin,
            ctx.user.user_id,
            None,
            Money::new(100_00),
            "proof.png",
            None,
            false,
            Utc::now(),
        )
        .await
        .unwrap();
    assert!(!settlement.user_acknowledged);

    let acked = ctx
        .engine
        .acknowledge_settlement(&ctx.user, settlement.id)
        .await
        .unwrap();
    assert!(acked.user_acknowledged);

    // Someone else's settlement is invisible to the user.
    let err = ctx
        .engine
        .acknowledge_settlement(&ctx.admin, settlement.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn one_open_mission_per_user() {
    let ctx = common::setup().await;
    ctx.engine
        .start_mission(&ctx.user, "Nagpur survey", day(), None, Utc::now())
        .await
        .unwrap();

    let err = ctx
        .engine
        .start_mission(&ctx.user, "Mumbai expo", day(), None, Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Nagpur survey".to_string()));

    // Finishing the first frees the slot.
    let active = ctx.engine.active_mission(&ctx.user).await.unwrap().unwrap();
    ctx.engine
        .finish_mission(&ctx.user, active.id, day(), Utc::now())
        .await
        .unwrap();
    ctx.engine
        .start_mission(&ctx.user, "Mumbai expo", day(), None, Utc::now())
        .await
        .unwrap();
}

#[tokio::test]
async fn account_approval_flow() {
    let ctx = common::setup().await;
    let pending = ctx
        .engine
        .register_account("meera", "meera@example.com", "secret", Utc::now())
        .await
        .unwrap();

    let err = ctx
        .engine
        .authenticate("meera@example.com", "secret")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    ctx.engine
        .approve_account(&ctx.admin, pending, Utc::now())
        .await
        .unwrap();

    let session = ctx
        .engine
        .authenticate("meera@example.com", "secret")
        .await
        .unwrap();
    assert_eq!(session.user_id, pending);
    assert_eq!(session.role, Role::User);

    let err = ctx
        .engine
        .authenticate("meera@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn admin_cannot_demote_self() {
    let ctx = common::setup().await;
    let err = ctx
        .engine
        .set_role(&ctx.admin, ctx.admin.user_id, Role::User)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    ctx.engine
        .set_role(&ctx.admin, ctx.user.user_id, Role::Admin)
        .await
        .unwrap();
    let accounts = ctx.engine.list_profiles(&ctx.admin).await.unwrap();
    let promoted = accounts
        .iter()
        .find(|a| a.id == ctx.user.user_id)
        .unwrap();
    assert_eq!(promoted.role, Role::Admin);
}
