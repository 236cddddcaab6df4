//! CSV report export

use api_types::expense::ListFilter;
use axum::{
    Extension,
    extract::{Json, State},
    http::header,
    response::IntoResponse,
};

use crate::{ServerError, expenses::filter_from_api, server::ServerState};
use engine::{Money, Session};

fn csv_amount(amount: Money) -> String {
    let paise = amount.paise();
    format!("{}.{:02}", paise / 100, paise.rem_euclid(100))
}

/// Streams the filtered ledger as a `text/csv` attachment. Admin only.
pub async fn export(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(filter): Json<ListFilter>,
) -> Result<impl IntoResponse, ServerError> {
    let rows = state
        .engine
        .report_rows(&session, &filter_from_api(filter))
        .await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["date", "user", "category", "description", "amount", "status"])
        .map_err(|err| ServerError::Generic(err.to_string()))?;
    for row in rows {
        writer
            .write_record([
                row.date.to_string(),
                row.user,
                row.category.as_str().to_string(),
                row.description,
                csv_amount(row.amount),
                row.status.as_str().to_string(),
            ])
            .map_err(|err| ServerError::Generic(err.to_string()))?;
    }
    let body = writer
        .into_inner()
        .map_err(|err| ServerError::Generic(err.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"expenses.csv\"",
            ),
        ],
        body,
    ))
}
