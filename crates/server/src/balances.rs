//! Balance and mission statistics endpoints

use api_types::{balance::BalanceView, mission::MissionStats};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::Session;

pub async fn own(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<BalanceView>, ServerError> {
    let summary = state.engine.user_balance(&session, None).await?;
    Ok(Json(BalanceView {
        spent_paise: summary.spent.paise(),
        received_paise: summary.received.paise(),
        balance_paise: summary.balance.paise(),
    }))
}

pub async fn of_user(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<BalanceView>, ServerError> {
    let summary = state.engine.user_balance(&session, Some(user_id)).await?;
    Ok(Json(BalanceView {
        spent_paise: summary.spent.paise(),
        received_paise: summary.received.paise(),
        balance_paise: summary.balance.paise(),
    }))
}

pub async fn mission_stats(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MissionStats>, ServerError> {
    let stats = state.engine.mission_stats(&session, id).await?;
    Ok(Json(MissionStats {
        expense_paise: stats.expense.paise(),
        received_paise: stats.received.paise(),
    }))
}
