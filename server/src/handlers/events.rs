use std::fmt;
use std::str::FromStr;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::{de, Deserialize, Deserializer};
use uuid::Uuid;

use crate::models::{CreateEventPayload, UpdateEventPayload};
use crate::state::AppState;
use crate::utils::caller::VerifiedCaller;
use crate::utils::error::AppResult;
use crate::utils::pagination::PageRequest;
use crate::utils::response::{attachment, created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub search_key: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsParams {
    pub event_id: Uuid,
}

/// `?page=` arrives as an empty string; read it as absent rather than
/// rejecting the request.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

fn page_request(page: Option<u32>, limit: Option<u32>) -> PageRequest {
    PageRequest { page, limit }
}

pub async fn list_events(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = params?;
    let page = state
        .queries
        .find_all(
            params.active.unwrap_or(false),
            page_request(params.page, params.limit),
        )
        .await?;

    Ok(success(page, "Events retrieved"))
}

pub async fn get_event(
    State(state): State<AppState>,
    event_id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let Path(event_id) = event_id?;
    let event = state.queries.find_by_id(event_id).await?;

    Ok(success(event, "Event retrieved"))
}

pub async fn create_event(
    State(state): State<AppState>,
    caller: VerifiedCaller,
    payload: Result<Json<CreateEventPayload>, JsonRejection>,
) -> AppResult<Response> {
    let Json(payload) = payload?;
    let event = state
        .aggregates
        .create_event_aggregate(&caller, payload)
        .await?;

    Ok(created(event, "Event created"))
}

pub async fn update_event(
    State(state): State<AppState>,
    caller: VerifiedCaller,
    event_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateEventPayload>, JsonRejection>,
) -> AppResult<Response> {
    let Path(event_id) = event_id?;
    let Json(payload) = payload?;
    let event = state
        .aggregates
        .update_event_aggregate(&caller, event_id, payload)
        .await?;

    Ok(success(event, "Event updated"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    caller: VerifiedCaller,
    event_id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let Path(event_id) = event_id?;
    state
        .aggregates
        .delete_event_aggregate(&caller, event_id)
        .await?;

    Ok(empty_success(format!("Event '{}' deleted", event_id)))
}

pub async fn upcoming_events(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = params?;
    let page = state
        .queries
        .upcoming_events(page_request(params.page, params.limit))
        .await?;

    Ok(success(page, "Upcoming events retrieved"))
}

pub async fn previous_events(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = params?;
    let page = state
        .queries
        .previous_events(page_request(params.page, params.limit))
        .await?;

    Ok(success(page, "Previous events retrieved"))
}

pub async fn search_events(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = params?;
    let page = state
        .queries
        .search_events(
            page_request(params.page, params.limit),
            params.search_key.as_deref(),
        )
        .await?;

    Ok(success(page, "Events retrieved"))
}

pub async fn download_events(
    State(state): State<AppState>,
    params: Result<Query<DownloadParams>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = params?;
    let csv = state
        .queries
        .download(params.active.unwrap_or(false))
        .await?;

    Ok(attachment(csv, "text/csv; charset=utf-8", "events.csv"))
}

pub async fn event_details(
    State(state): State<AppState>,
    params: Result<Query<DetailsParams>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = params?;
    let details = state.queries.event_details(params.event_id).await?;

    Ok(success(details, "Event details retrieved"))
}
