//! Expense API endpoints

use api_types::expense::{
    ApproveExpense, DraftGroup, ExpenseView, ExpensesResponse, ListFilter, RejectExpense,
    SubmitExpenses, UpdateExpense,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, storage};
use engine::{Expense, ExpenseListFilter, ExpenseUpdate, Money, Session};

pub(crate) fn category_from_api(category: api_types::Category) -> engine::Category {
    match category {
        api_types::Category::Travel => engine::Category::Travel,
        api_types::Category::Meal => engine::Category::Meal,
        api_types::Category::Hotel => engine::Category::Hotel,
        api_types::Category::Luggage => engine::Category::Luggage,
        api_types::Category::Cash => engine::Category::Cash,
        api_types::Category::Other => engine::Category::Other,
    }
}

pub(crate) fn category_to_api(category: engine::Category) -> api_types::Category {
    match category {
        engine::Category::Travel => api_types::Category::Travel,
        engine::Category::Meal => api_types::Category::Meal,
        engine::Category::Hotel => api_types::Category::Hotel,
        engine::Category::Luggage => api_types::Category::Luggage,
        engine::Category::Cash => api_types::Category::Cash,
        engine::Category::Other => api_types::Category::Other,
    }
}

pub(crate) fn status_from_api(status: api_types::ExpenseStatus) -> engine::ExpenseStatus {
    match status {
        api_types::ExpenseStatus::Pending => engine::ExpenseStatus::Pending,
        api_types::ExpenseStatus::Approved => engine::ExpenseStatus::Approved,
        api_types::ExpenseStatus::Rejected => engine::ExpenseStatus::Rejected,
        api_types::ExpenseStatus::Settled => engine::ExpenseStatus::Settled,
    }
}

pub(crate) fn status_to_api(status: engine::ExpenseStatus) -> api_types::ExpenseStatus {
    match status {
        engine::ExpenseStatus::Pending => api_types::ExpenseStatus::Pending,
        engine::ExpenseStatus::Approved => api_types::ExpenseStatus::Approved,
        engine::ExpenseStatus::Rejected => api_types::ExpenseStatus::Rejected,
        engine::ExpenseStatus::Settled => api_types::ExpenseStatus::Settled,
    }
}

pub(crate) fn expense_view(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        user_id: expense.user_id,
        mission_id: expense.mission_id,
        date: expense.date,
        category: category_to_api(expense.category),
        description: expense.description,
        amount_paise: expense.amount.paise(),
        image_url: expense.image_url,
        status: status_to_api(expense.status),
        admin_note: expense.admin_note,
        rejected_reason: expense.rejected_reason,
        approved_by: expense.approved_by,
        approved_at: expense.approved_at,
        created_at: expense.created_at,
    }
}

pub(crate) fn filter_from_api(filter: ListFilter) -> ExpenseListFilter {
    ExpenseListFilter {
        owner: filter.user_id,
        mission: filter.mission_id,
        category: filter.category.map(category_from_api),
        status: filter.status.map(status_from_api),
        from: filter.from,
        to: filter.to,
    }
}

fn drafts_from_api(groups: Vec<DraftGroup>) -> Vec<engine::DraftGroup> {
    groups
        .into_iter()
        .map(|g| engine::DraftGroup {
            category: category_from_api(g.category),
            rows: g
                .rows
                .into_iter()
                .map(|r| engine::DraftRow {
                    description: r.description,
                    amount: r.amount,
                    image_url: r.image_url,
                })
                .collect(),
        })
        .collect()
}

/// Handle requests for submitting a batch of draft rows.
pub async fn submit(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<SubmitExpenses>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let drafts = drafts_from_api(payload.groups);
    let created = state
        .engine
        .submit_expenses(
            &session,
            payload.date,
            payload.mission_id,
            &drafts,
            Utc::now(),
        )
        .await?;

    Ok(Json(ExpensesResponse {
        expenses: created.into_iter().map(expense_view).collect(),
    }))
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state
        .engine
        .list_expenses(&session, &filter_from_api(filter))
        .await?;
    Ok(Json(ExpensesResponse {
        expenses: expenses.into_iter().map(expense_view).collect(),
    }))
}

/// Same predicate as [`list`], for clients that prefer a JSON body.
pub async fn list_filtered(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(filter): Json<ListFilter>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state
        .engine
        .list_expenses(&session, &filter_from_api(filter))
        .await?;
    Ok(Json(ExpensesResponse {
        expenses: expenses.into_iter().map(expense_view).collect(),
    }))
}

/// Owner edit of a pending entry. Replacing the receipt schedules a
/// best-effort delete of the superseded object.
pub async fn update(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExpense>,
) -> Result<Json<ExpenseView>, ServerError> {
    let update = ExpenseUpdate {
        description: payload.description,
        amount: payload.amount_paise.map(Money::new),
        image_url: payload.image_url,
    };
    let (expense, superseded) = state
        .engine
        .update_expense(&session, id, update, Utc::now())
        .await?;

    if let Some(url) = superseded {
        storage::cleanup_receipt(state.store.clone(), url);
    }
    Ok(Json(expense_view(expense)))
}

pub async fn remove(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<(), ServerError> {
    let orphaned = state.engine.delete_expense(&session, id).await?;
    if let Some(url) = orphaned {
        storage::cleanup_receipt(state.store.clone(), url);
    }
    Ok(())
}

pub async fn approve(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveExpense>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .approve_expense(
            &session,
            id,
            payload.corrected_amount_paise.map(Money::new),
            payload.note.as_deref(),
            Utc::now(),
        )
        .await?;
    Ok(Json(expense_view(expense)))
}

pub async fn reject(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectExpense>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .reject_expense(&session, id, &payload.reason, Utc::now())
        .await?;
    Ok(Json(expense_view(expense)))
}
