use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use super::domain::{
    ApplicationFilter, ApplicationId, ApplicationStatus, CompanyId, Decision, PositionFilter,
    PositionId, PositionStatus,
};
use super::identity::Actor;
use super::messages::{self, Locale};
use super::notification::NotificationDispatcher;
use super::service::{FailureKind, HiringWorkflowService, TransitionOutcome, WorkflowError};
use super::store::HiringStore;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const ACTOR_COMPANY_HEADER: &str = "x-actor-company";

/// Router builder exposing the apply, transition, delete, and lookup endpoints.
pub fn hiring_router<S, N>(service: Arc<HiringWorkflowService<S, N>>) -> Router
where
    S: HiringStore + 'static,
    N: NotificationDispatcher + 'static,
{
    Router::new()
        .route("/api/v1/positions", get(positions_handler::<S, N>))
        .route(
            "/api/v1/positions/:position_id/applications",
            post(apply_handler::<S, N>),
        )
        .route("/api/v1/applications", get(list_handler::<S, N>))
        .route(
            "/api/v1/applications/:application_id",
            get(get_handler::<S, N>).delete(delete_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            patch(transition_handler::<S, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionRequest {
    pub(crate) status: Decision,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApplicationQuery {
    #[serde(default)]
    pub(crate) status: Option<ApplicationStatus>,
    #[serde(default)]
    pub(crate) position_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PositionQuery {
    #[serde(default)]
    pub(crate) status: Option<PositionStatus>,
    #[serde(default)]
    pub(crate) company_id: Option<String>,
}

/// Resolve the session identity forwarded by the upstream auth layer.
pub(crate) fn actor_from_headers(headers: &HeaderMap) -> Option<Actor> {
    let user_id = header_value(headers, ACTOR_ID_HEADER)?;
    let role = header_value(headers, ACTOR_ROLE_HEADER)?.to_ascii_lowercase();
    match role.as_str() {
        "job_seeker" | "jobseeker" | "employee" => Some(Actor::job_seeker(user_id)),
        "hr" | "human_resource" => Some(Actor::hr(
            user_id,
            header_value(headers, ACTOR_COMPANY_HEADER)?,
        )),
        "admin" => Some(Actor::admin(user_id)),
        _ => None,
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn request_locale(headers: &HeaderMap, default: Locale) -> Locale {
    let accept = headers
        .get(axum::http::header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    Locale::negotiate(accept, default)
}

fn status_for(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::NotAnEmployee | FailureKind::Unauthorized => StatusCode::FORBIDDEN,
        FailureKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        FailureKind::PositionNotFound
        | FailureKind::ApplicationNotFound
        | FailureKind::EmployeeNotFound => StatusCode::NOT_FOUND,
        FailureKind::PositionClosed | FailureKind::PositionFull => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        FailureKind::DuplicateApplication => StatusCode::CONFLICT,
        FailureKind::InvalidRequest => StatusCode::BAD_REQUEST,
        FailureKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure_response(kind: FailureKind, locale: Locale) -> Response {
    let payload = json!({
        "error": true,
        "code": kind.code(),
        "message": messages::failure_message(kind, locale),
    });
    (status_for(kind), Json(payload)).into_response()
}

fn workflow_failure(err: WorkflowError, operation: &'static str, locale: Locale) -> Response {
    if err.is_infrastructure() {
        error!(operation, error = %err, "workflow operation failed");
    }
    failure_response(err.kind(), locale)
}

fn invalid_request(operation: &'static str, detail: String, locale: Locale) -> Response {
    warn!(operation, detail = %detail, "malformed request refused");
    failure_response(FailureKind::InvalidRequest, locale)
}

pub(crate) async fn apply_handler<S, N>(
    State(service): State<Arc<HiringWorkflowService<S, N>>>,
    Path(position_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: HiringStore + 'static,
    N: NotificationDispatcher + 'static,
{
    let locale = request_locale(&headers, service.locale());
    let Some(actor) = actor_from_headers(&headers) else {
        return failure_response(FailureKind::Unauthenticated, locale);
    };

    match service.apply(&actor, &PositionId(position_id)) {
        Ok(application) => {
            let payload = json!({
                "error": false,
                "message": messages::applied_message(locale),
                "application": application,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => workflow_failure(err, "apply", locale),
    }
}

pub(crate) async fn transition_handler<S, N>(
    State(service): State<Arc<HiringWorkflowService<S, N>>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
    request: Result<Json<TransitionRequest>, JsonRejection>,
) -> Response
where
    S: HiringStore + 'static,
    N: NotificationDispatcher + 'static,
{
    let locale = request_locale(&headers, service.locale());
    let Some(actor) = actor_from_headers(&headers) else {
        return failure_response(FailureKind::Unauthenticated, locale);
    };
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => return invalid_request("transition", rejection.body_text(), locale),
    };

    match service.transition(&actor, &ApplicationId(application_id), request.status) {
        Ok(outcome) => {
            let (label, message) = match &outcome {
                TransitionOutcome::Saved { .. } => {
                    ("saved", messages::transition_saved_message(locale))
                }
                TransitionOutcome::SavedButNotificationFailed { .. } => (
                    "saved_notification_failed",
                    messages::notification_failed_message(locale),
                ),
            };
            let payload = json!({
                "error": false,
                "outcome": label,
                "message": message,
                "application": outcome.application(),
                "notification": { "delivered": outcome.notification_delivered() },
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => workflow_failure(err, "transition", locale),
    }
}

pub(crate) async fn delete_handler<S, N>(
    State(service): State<Arc<HiringWorkflowService<S, N>>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: HiringStore + 'static,
    N: NotificationDispatcher + 'static,
{
    let locale = request_locale(&headers, service.locale());
    let Some(actor) = actor_from_headers(&headers) else {
        return failure_response(FailureKind::Unauthenticated, locale);
    };

    match service.delete(&actor, &ApplicationId(application_id)) {
        Ok(removed) => {
            let payload = json!({
                "error": false,
                "message": messages::deleted_message(locale),
                "application_id": removed.id,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => workflow_failure(err, "delete", locale),
    }
}

pub(crate) async fn get_handler<S, N>(
    State(service): State<Arc<HiringWorkflowService<S, N>>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: HiringStore + 'static,
    N: NotificationDispatcher + 'static,
{
    let locale = request_locale(&headers, service.locale());
    let Some(actor) = actor_from_headers(&headers) else {
        return failure_response(FailureKind::Unauthenticated, locale);
    };

    match service.get(&actor, &ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => workflow_failure(err, "get", locale),
    }
}

pub(crate) async fn list_handler<S, N>(
    State(service): State<Arc<HiringWorkflowService<S, N>>>,
    headers: HeaderMap,
    query: Result<Query<ApplicationQuery>, QueryRejection>,
) -> Response
where
    S: HiringStore + 'static,
    N: NotificationDispatcher + 'static,
{
    let locale = request_locale(&headers, service.locale());
    let Some(actor) = actor_from_headers(&headers) else {
        return failure_response(FailureKind::Unauthenticated, locale);
    };
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return invalid_request("list", rejection.body_text(), locale),
    };

    let filter = ApplicationFilter {
        status: query.status,
        position_id: query.position_id.map(PositionId),
        ..ApplicationFilter::default()
    };
    match service.list(&actor, filter) {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(err) => workflow_failure(err, "list", locale),
    }
}

pub(crate) async fn positions_handler<S, N>(
    State(service): State<Arc<HiringWorkflowService<S, N>>>,
    headers: HeaderMap,
    query: Result<Query<PositionQuery>, QueryRejection>,
) -> Response
where
    S: HiringStore + 'static,
    N: NotificationDispatcher + 'static,
{
    let locale = request_locale(&headers, service.locale());
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return invalid_request("positions", rejection.body_text(), locale),
    };
    let filter = PositionFilter {
        company_id: query.company_id.map(CompanyId),
        status: query.status,
    };
    match service.positions(&filter, Utc::now()) {
        Ok(positions) => (StatusCode::OK, Json(positions)).into_response(),
        Err(err) => workflow_failure(err, "positions", locale),
    }
}
