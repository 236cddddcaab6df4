//! Mission API endpoints

use api_types::mission::{FinishMission, MissionView, MissionsResponse, StartMission};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{Mission, Session};

fn mission_view(mission: Mission) -> MissionView {
    MissionView {
        id: mission.id,
        user_id: mission.user_id,
        name: mission.name,
        status: mission.status.as_str().to_string(),
        start_date: mission.start_date,
        end_date: mission.end_date,
        details: mission.details,
    }
}

pub async fn start(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<StartMission>,
) -> Result<Json<MissionView>, ServerError> {
    let mission = state
        .engine
        .start_mission(
            &session,
            &payload.name,
            payload.start_date,
            payload.details.as_deref(),
            Utc::now(),
        )
        .await?;
    Ok(Json(mission_view(mission)))
}

pub async fn finish(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FinishMission>,
) -> Result<Json<MissionView>, ServerError> {
    let mission = state
        .engine
        .finish_mission(&session, id, payload.end_date, Utc::now())
        .await?;
    Ok(Json(mission_view(mission)))
}

pub async fn active(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<Option<MissionView>>, ServerError> {
    let mission = state.engine.active_mission(&session).await?;
    Ok(Json(mission.map(mission_view)))
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<MissionsResponse>, ServerError> {
    let missions = state.engine.list_missions(&session, None).await?;
    Ok(Json(MissionsResponse {
        missions: missions.into_iter().map(mission_view).collect(),
    }))
}
