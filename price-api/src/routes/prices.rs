use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Json;
use mtg_price_tracker::config::DEFAULT_HISTORY_LIMIT;
use mtg_price_tracker::PriceView;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::CallerId;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PriceParams {
    pub refresh: Option<String>,
}

#[derive(Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

/// GET /api/cards/{card_id}/price?refresh=true
///
/// Current price of a card the caller owns. Served from the cached price
/// while it is fresh; `refresh=true` forces a refetch from Scryfall.
pub async fn get_price(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    Path(card_id): Path<String>,
    Query(params): Query<PriceParams>,
) -> Result<Json<PriceView>, AppError> {
    let force_refresh = parse_flag(params.refresh.as_deref())?;
    let view = state
        .tracker
        .get_price(&user_id, &card_id, force_refresh)
        .await?;
    Ok(Json(view))
}

/// GET /api/cards/{card_id}/price/history?limit=100
///
/// The caller's recorded prices for a card, oldest first.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    Path(card_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Value>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let entries = state
        .tracker
        .price_history(&user_id, &card_id, limit)
        .await?;

    let count = entries.len();
    Ok(Json(json!({ "cardId": card_id, "data": entries, "count": count })))
}

fn parse_flag(raw: Option<&str>) -> Result<bool, AppError> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(other) => Err(AppError::bad_request(format!(
            "Invalid value for refresh: '{other}'"
        ))),
    }
}
