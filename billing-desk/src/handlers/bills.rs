//! Bill draft endpoints.
//!
//! Every handler locks the draft it touches for the whole operation, so two
//! requests against the same bill never interleave. Submission keeps the lock
//! across the backend call.

use crate::dtos::{AddItemRequest, AddItemResponse, BillView, SubmitResponse};
use crate::error::{into_app_error, submission_error};
use crate::services::metrics::{record_submission, record_submission_failure};
use crate::services::{render_receipt, CallContext, SharedDraft};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bill_ledger::{BillMetadata, LineItem, LineItemId, SubmissionError};
use rust_decimal::prelude::ToPrimitive;
use service_core::error::AppError;
use service_core::observability::{extract_bearer_token, extract_request_id};
use tracing::{info, instrument, warn};
use uuid::Uuid;

fn call_context(headers: &HeaderMap) -> CallContext {
    CallContext {
        bearer_token: extract_bearer_token(headers),
        request_id: extract_request_id(headers),
    }
}

fn find_draft(state: &AppState, bill_id: Uuid) -> Result<SharedDraft, AppError> {
    state
        .store
        .get(&bill_id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Bill {} not found", bill_id)))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::ValidationError(rejection.body_text()))
}

fn failure_reason(err: &SubmissionError) -> &'static str {
    match err {
        SubmissionError::Rejected { .. } => "rejected",
        SubmissionError::Unreachable(_) => "unreachable",
        SubmissionError::InvalidResponse(_) => "invalid_response",
    }
}

#[instrument(skip(state))]
pub async fn create_bill(State(state): State<AppState>) -> impl IntoResponse {
    let (bill_id, draft) = state.store.create();
    let draft = draft.lock().await;
    info!(bill_id = %bill_id, "Bill draft created");
    (StatusCode::CREATED, Json(BillView::of(bill_id, &draft)))
}

pub async fn get_bill(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
) -> Result<Json<BillView>, AppError> {
    let draft = find_draft(&state, bill_id)?;
    let draft = draft.lock().await;
    Ok(Json(BillView::of(bill_id, &draft)))
}

#[instrument(skip(state, payload))]
pub async fn update_metadata(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
    payload: Result<Json<BillMetadata>, JsonRejection>,
) -> Result<Json<BillView>, AppError> {
    let metadata = json_body(payload)?;
    let draft = find_draft(&state, bill_id)?;
    let mut draft = draft.lock().await;
    draft.set_metadata(metadata);
    Ok(Json(BillView::of(bill_id, &draft)))
}

#[instrument(skip(state))]
pub async fn auto_fill(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
) -> Result<Json<BillView>, AppError> {
    let draft = find_draft(&state, bill_id)?;
    let mut draft = draft.lock().await;
    draft.auto_fill(chrono::Local::now().naive_local());
    Ok(Json(BillView::of(bill_id, &draft)))
}

#[instrument(skip(state, payload))]
pub async fn add_item(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
    payload: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AddItemResponse>), AppError> {
    let request = json_body(payload)?;
    let draft = find_draft(&state, bill_id)?;

    // Validate before locking; a bad item never reaches the ledger.
    let item = LineItem::parse(
        &request.description,
        &request.quantity_text(),
        &request.price_text(),
    )
    .map_err(|e| {
        warn!(bill_id = %bill_id, error = %e, "Rejected line item");
        into_app_error(e)
    })?;

    let mut draft = draft.lock().await;
    let item_id = draft.add_item(item).map_err(|e| {
        warn!(bill_id = %bill_id, error = %e, "Line item would overflow bill totals");
        into_app_error(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(AddItemResponse {
            item_id: item_id.to_string(),
            bill: BillView::of(bill_id, &draft),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    Path((bill_id, item_id)): Path<(Uuid, String)>,
) -> Result<Json<BillView>, AppError> {
    let draft = find_draft(&state, bill_id)?;
    let mut draft = draft.lock().await;

    // Ids that never existed, malformed or not, leave the bill untouched.
    match item_id.parse::<LineItemId>() {
        Ok(id) => {
            if draft.remove_item(&id).is_none() {
                info!(bill_id = %bill_id, item_id = %item_id, "Item not on bill, nothing removed");
            }
        }
        Err(_) => info!(bill_id = %bill_id, item_id = %item_id, "Unrecognised item id"),
    }

    Ok(Json(BillView::of(bill_id, &draft)))
}

#[instrument(skip(state, headers))]
pub async fn receipt(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = {
        let draft = find_draft(&state, bill_id)?;
        let mut draft = draft.lock().await;
        let snapshot = draft.snapshot().map_err(into_app_error)?;
        snapshot
    };

    let profile = match state.backend.restaurant_profile(&call_context(&headers)).await {
        Ok(profile) => profile.merged_over(&state.settings.restaurant),
        Err(e) => {
            warn!(error = %e, "Restaurant profile unavailable, using configured details");
            state.settings.restaurant.clone()
        }
    };

    let text = render_receipt(&snapshot, &profile, &state.settings.billing.currency_symbol)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    ))
}

#[instrument(skip(state, headers))]
pub async fn submit_bill(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<SubmitResponse>, AppError> {
    let draft = find_draft(&state, bill_id)?;
    let mut draft = draft.lock().await;

    let snapshot = draft.snapshot().map_err(|e| {
        record_submission_failure("incomplete");
        into_app_error(e)
    })?;

    let confirmed = state
        .backend
        .submit_bill(&snapshot, &call_context(&headers))
        .await
        .map_err(|e| {
            record_submission_failure(failure_reason(&e));
            warn!(bill_id = %bill_id, error = %e, "Bill submission failed, draft kept");
            submission_error(e)
        })?;

    draft.complete_submission(confirmed.clone());
    record_submission(snapshot.grand_total().amount().to_f64().unwrap_or_default());

    Ok(Json(SubmitResponse {
        bill_number: confirmed,
        bill: BillView::of(bill_id, &draft),
    }))
}

#[instrument(skip(state))]
pub async fn cancel_bill(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let draft = state
        .store
        .remove(&bill_id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Bill {} not found", bill_id)))?;
    draft.lock().await.cancel();
    info!(bill_id = %bill_id, "Bill draft discarded");
    Ok(StatusCode::NO_CONTENT)
}
