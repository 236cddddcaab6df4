//! Category limit API endpoints

use api_types::limits::{LimitView, LimitsResponse, SetLimit};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;

use crate::{ServerError, expenses::category_to_api, server::ServerState};
use engine::{Category, Money, Session};

pub async fn list(
    Extension(_session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<LimitsResponse>, ServerError> {
    let policy = state.engine.get_policy().await?;
    let mut limits: Vec<LimitView> = policy
        .iter()
        .map(|(category, cap)| LimitView {
            category: category_to_api(category),
            daily_limit_paise: cap.paise(),
        })
        .collect();
    limits.sort_by_key(|l| l.category.as_str());
    Ok(Json(LimitsResponse { limits }))
}

pub async fn set(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(category): Path<String>,
    Json(payload): Json<SetLimit>,
) -> Result<Json<LimitView>, ServerError> {
    let category = Category::try_from(category.as_str())?;
    state
        .engine
        .update_limit(
            &session,
            category,
            Money::new(payload.daily_limit_paise),
            Utc::now(),
        )
        .await?;
    Ok(Json(LimitView {
        category: category_to_api(category),
        daily_limit_paise: payload.daily_limit_paise,
    }))
}
