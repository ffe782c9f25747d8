use super::AppState;
use crate::types::CallSetsResponse;
use axum::{Json, extract::State};

pub async fn get_callsets(State(state): State<AppState>) -> Json<CallSetsResponse> {
    Json(CallSetsResponse {
        call_set_names: state.source.call_names().await,
    })
}
