//! Settlement API endpoints

use api_types::settlement::{RecordSettlement, SettlementView, SettlementsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{Money, Session, Settlement};

fn settlement_view(settlement: Settlement) -> SettlementView {
    SettlementView {
        id: settlement.id,
        user_id: settlement.user_id,
        mission_id: settlement.mission_id,
        amount_paise: settlement.amount.paise(),
        proof_url: settlement.proof_url,
        note: settlement.note,
        settled_by: settlement.settled_by,
        user_acknowledged: settlement.user_acknowledged,
        created_at: settlement.created_at,
    }
}

pub async fn record(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<RecordSettlement>,
) -> Result<Json<SettlementView>, ServerError> {
    let settlement = state
        .engine
        .record_settlement(
            &session,
            payload.user_id,
            payload.mission_id,
            Money::new(payload.amount_paise),
            &payload.proof_url,
            payload.note.as_deref(),
            payload.settle_expenses,
            Utc::now(),
        )
        .await?;
    Ok(Json(settlement_view(settlement)))
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<SettlementsResponse>, ServerError> {
    let settlements = state.engine.list_settlements(&session, None).await?;
    Ok(Json(SettlementsResponse {
        settlements: settlements.into_iter().map(settlement_view).collect(),
    }))
}

pub async fn acknowledge(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SettlementView>, ServerError> {
    let settlement = state.engine.acknowledge_settlement(&session, id).await?;
    Ok(Json(settlement_view(settlement)))
}
