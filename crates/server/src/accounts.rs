//! Account administration endpoints

use api_types::account::{AccountView, AccountsResponse, Register, SetRole};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{Role, Session};

fn role_to_api(role: Role) -> api_types::account::Role {
    match role {
        Role::Admin => api_types::account::Role::Admin,
        Role::User => api_types::account::Role::User,
    }
}

fn role_from_api(role: api_types::account::Role) -> Role {
    match role {
        api_types::account::Role::Admin => Role::Admin,
        api_types::account::Role::User => Role::User,
    }
}

/// Unauthenticated registration; the account stays unusable until an admin
/// approves it.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<Register>,
) -> Result<(StatusCode, Json<Uuid>), ServerError> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(ServerError::Generic(
            "name, email and password are required".to_string(),
        ));
    }
    let id = state
        .engine
        .register_account(&payload.name, &payload.email, &payload.password, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(id)))
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<AccountsResponse>, ServerError> {
    let accounts = state.engine.list_profiles(&session).await?;
    Ok(Json(AccountsResponse {
        accounts: accounts
            .into_iter()
            .map(|a| AccountView {
                id: a.id,
                name: a.name,
                email: a.email,
                is_approved: a.is_approved,
                role: role_to_api(a.role),
            })
            .collect(),
    }))
}

pub async fn approve(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<(), ServerError> {
    state.engine.approve_account(&session, id, Utc::now()).await?;
    Ok(())
}

pub async fn set_role(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetRole>,
) -> Result<(), ServerError> {
    state
        .engine
        .set_role(&session, id, role_from_api(payload.role))
        .await?;
    Ok(())
}
