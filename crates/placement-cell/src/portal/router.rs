use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ProfileUpdate, StudentRecord, UserId};
use super::openings::{OpeningDraft, OpeningService};
use super::repository::{InterestStore, OpeningStore, SelectionStore, StoreError, UserStore};
use super::selections::SelectionService;
use super::service::{InterestService, PortalError};

/// The portal's service facade, shared as router state.
pub struct PortalServices<U, O, S, I> {
    pub interest: InterestService<U, O, S, I>,
    pub openings: OpeningService<U, O>,
    pub selections: SelectionService<U, O, S, I>,
    users: Arc<U>,
}

impl<U, O, S, I> PortalServices<U, O, S, I>
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    pub fn new(users: Arc<U>, openings: Arc<O>, selections: Arc<S>, interests: Arc<I>) -> Self {
        Self {
            interest: InterestService::new(
                users.clone(),
                openings.clone(),
                selections.clone(),
                interests.clone(),
            ),
            openings: OpeningService::new(users.clone(), openings.clone()),
            selections: SelectionService::new(
                users.clone(),
                openings,
                selections,
                interests,
            ),
            users,
        }
    }

    /// Let the signed-in user revise their own academic profile. The CGPA
    /// clamp runs inside the store write.
    pub fn update_profile(
        &self,
        acting: &UserId,
        update: ProfileUpdate,
    ) -> Result<StudentRecord, PortalError> {
        match self.users.update_profile(acting, update) {
            Ok(record) => Ok(record),
            Err(StoreError::NotFound) => Err(PortalError::UserNotFound),
            Err(other) => Err(PortalError::Store(other)),
        }
    }
}

/// Router builder exposing the portal's HTTP endpoints.
pub fn portal_router<U, O, S, I>(services: Arc<PortalServices<U, O, S, I>>) -> Router
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/job-interest/express",
            post(express_handler::<U, O, S, I>),
        )
        .route(
            "/api/v1/job-interest/status/:opening_id",
            get(interest_status_handler::<U, O, S, I>),
        )
        .route(
            "/api/v1/job-interest/statistics/:opening_id",
            get(statistics_handler::<U, O, S, I>),
        )
        .route(
            "/api/v1/openings",
            get(list_openings_handler::<U, O, S, I>).post(add_opening_handler::<U, O, S, I>),
        )
        .route(
            "/api/v1/openings/:opening_id",
            get(get_opening_handler::<U, O, S, I>)
                .put(update_opening_handler::<U, O, S, I>)
                .delete(delete_opening_handler::<U, O, S, I>),
        )
        .route(
            "/api/v1/selections",
            get(list_selections_handler::<U, O, S, I>),
        )
        .route(
            "/api/v1/selections/student-status",
            get(student_status_handler::<U, O, S, I>),
        )
        .route(
            "/api/v1/selections/applied-shortlisted",
            get(applied_shortlisted_handler::<U, O, S, I>),
        )
        .route(
            "/api/v1/selections/:id",
            post(add_selections_handler::<U, O, S, I>)
                .delete(delete_selection_handler::<U, O, S, I>),
        )
        .route(
            "/api/v1/users/profile",
            put(update_profile_handler::<U, O, S, I>),
        )
        .with_state(services)
}

/// The id the (external) auth layer extracted for the signed-in caller.
/// JWT verification itself lives outside this crate.
fn caller(headers: &HeaderMap) -> Result<UserId, Response> {
    match headers.get("x-user-id").and_then(|value| value.to_str().ok()) {
        Some(raw) if !raw.trim().is_empty() => Ok(UserId(raw.trim().to_string())),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": 0, "message": "Authentication required" })),
        )
            .into_response()),
    }
}

/// Map a service error onto the wire contract. Store failures are logged
/// here and surfaced with the handler's generic message.
fn error_response(error: PortalError, internal_message: &str) -> Response {
    match error {
        PortalError::Validation(message) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": 0, "message": message })),
        )
            .into_response(),
        PortalError::AlreadyPlaced { reason } => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": 0, "message": reason, "isPlaced": true })),
        )
            .into_response(),
        PortalError::Forbidden(reason) => (
            StatusCode::FORBIDDEN,
            Json(json!({ "success": 0, "message": reason })),
        )
            .into_response(),
        not_found @ (PortalError::OpeningNotFound
        | PortalError::UserNotFound
        | PortalError::StudentNotFound
        | PortalError::UnknownEnrolment(_)
        | PortalError::SelectionNotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": 0, "message": not_found.to_string() })),
        )
            .into_response(),
        PortalError::Store(error) => {
            tracing::error!(%error, "store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": 0, "message": internal_message })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExpressInterestRequest {
    #[serde(default)]
    pub(crate) opening_id: Option<String>,
    pub(crate) is_interested: bool,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

pub(crate) async fn express_handler<U, O, S, I>(
    State(services): State<Arc<PortalServices<U, O, S, I>>>,
    headers: HeaderMap,
    Json(request): Json<ExpressInterestRequest>,
) -> Response
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    let user_id = match caller(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    let opening_id = request.opening_id.unwrap_or_default();

    match services.interest.express_interest(
        &user_id,
        &opening_id,
        request.is_interested,
        request.reason,
    ) {
        Ok(ack) => (
            StatusCode::OK,
            Json(json!({
                "success": 1,
                "isEligible": ack.verdict.is_eligible,
                "eligibilityReason": ack.verdict.reason,
                "isPlaced": ack.verdict.is_placed,
                "message": ack.message,
            })),
        )
            .into_response(),
        Err(error) => error_response(error, "An error occurred while recording your interest"),
    }
}

pub(crate) async fn interest_status_handler<U, O, S, I>(
    State(services): State<Arc<PortalServices<U, O, S, I>>>,
    headers: HeaderMap,
    Path(opening_id): Path<String>,
) -> Response
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    let user_id = match caller(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    match services.interest.interest_status(&user_id, &opening_id) {
        Ok(status) => (
            StatusCode::OK,
            Json(json!({
                "success": 1,
                "data": {
                    "isInterested": status.is_interested,
                    "reason": status.reason,
                    "isEligible": status.verdict.is_eligible,
                    "eligibilityReason": status.verdict.reason,
                    "isPlaced": status.verdict.is_placed,
                },
            })),
        )
            .into_response(),
        Err(error) => error_response(error, "An error occurred while fetching interest status"),
    }
}

pub(crate) async fn statistics_handler<U, O, S, I>(
    State(services): State<Arc<PortalServices<U, O, S, I>>>,
    headers: HeaderMap,
    Path(opening_id): Path<String>,
) -> Response
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    let user_id = match caller(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    match services.interest.opening_statistics(&user_id, &opening_id) {
        Ok(statistics) => (
            StatusCode::OK,
            Json(json!({ "success": 1, "statistics": statistics })),
        )
            .into_response(),
        Err(error) => error_response(error, "An error occurred while fetching statistics"),
    }
}

pub(crate) async fn add_opening_handler<U, O, S, I>(
    State(services): State<Arc<PortalServices<U, O, S, I>>>,
    headers: HeaderMap,
    Json(draft): Json<OpeningDraft>,
) -> Response
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    let user_id = match caller(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    match services.openings.add_opening(&user_id, draft) {
        Ok(record) => (
            StatusCode::CREATED,
            Json(json!({ "success": 1, "message": "Opening added", "opening": record })),
        )
            .into_response(),
        Err(error) => error_response(error, "An error occurred while adding the opening"),
    }
}

pub(crate) async fn list_openings_handler<U, O, S, I>(
    State(services): State<Arc<PortalServices<U, O, S, I>>>,
    headers: HeaderMap,
) -> Response
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    if let Err(response) = caller(&headers) {
        return response;
    }

    match services.openings.list_openings() {
        Ok(openings) => (
            StatusCode::OK,
            Json(json!({ "success": 1, "openings": openings })),
        )
            .into_response(),
        Err(error) => error_response(error, "An error occurred while fetching openings"),
    }
}

pub(crate) async fn get_opening_handler<U, O, S, I>(
    State(services): State<Arc<PortalServices<U, O, S, I>>>,
    headers: HeaderMap,
    Path(opening_id): Path<String>,
) -> Response
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    if let Err(response) = caller(&headers) {
        return response;
    }

    match services.openings.get_opening(&opening_id) {
        Ok(record) => (
            StatusCode::OK,
            Json(json!({ "success": 1, "opening": record })),
        )
            .into_response(),
        Err(error) => error_response(error, "An error occurred while fetching the opening"),
    }
}

pub(crate) async fn update_opening_handler<U, O, S, I>(
    State(services): State<Arc<PortalServices<U, O, S, I>>>,
    headers: HeaderMap,
    Path(opening_id): Path<String>,
    Json(draft): Json<OpeningDraft>,
) -> Response
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    let user_id = match caller(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    match services.openings.update_opening(&user_id, &opening_id, draft) {
        Ok(record) => (
            StatusCode::OK,
            Json(json!({ "success": 1, "message": "Opening updated", "opening": record })),
        )
            .into_response(),
        Err(error) => error_response(error, "An error occurred while updating the opening"),
    }
}

pub(crate) async fn delete_opening_handler<U, O, S, I>(
    State(services): State<Arc<PortalServices<U, O, S, I>>>,
    headers: HeaderMap,
    Path(opening_id): Path<String>,
) -> Response
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    let user_id = match caller(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    match services.openings.delete_opening(&user_id, &opening_id) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": 1, "message": "Deleted successfully" })),
        )
            .into_response(),
        Err(error) => error_response(error, "An error occurred while deleting the opening"),
    }
}

pub(crate) async fn list_selections_handler<U, O, S, I>(
    State(services): State<Arc<PortalServices<U, O, S, I>>>,
    headers: HeaderMap,
) -> Response
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    if let Err(response) = caller(&headers) {
        return response;
    }

    match services.selections.list_selections() {
        Ok(selections) => (
            StatusCode::OK,
            Json(json!({ "success": 1, "selections": selections })),
        )
            .into_response(),
        Err(error) => error_response(error, "An error occurred while fetching selections"),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddSelectionsRequest {
    #[serde(default)]
    pub(crate) enrolment_nos: Vec<String>,
}

pub(crate) async fn add_selections_handler<U, O, S, I>(
    State(services): State<Arc<PortalServices<U, O, S, I>>>,
    headers: HeaderMap,
    Path(opening_id): Path<String>,
    Json(request): Json<AddSelectionsRequest>,
) -> Response
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    let user_id = match caller(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    match services
        .selections
        .add_selections(&user_id, &opening_id, &request.enrolment_nos)
    {
        Ok(inserted) => (
            StatusCode::OK,
            Json(json!({
                "success": 1,
                "message": "Selections added",
                "count": inserted,
            })),
        )
            .into_response(),
        Err(error) => error_response(error, "An error occurred while adding selections"),
    }
}

pub(crate) async fn delete_selection_handler<U, O, S, I>(
    State(services): State<Arc<PortalServices<U, O, S, I>>>,
    headers: HeaderMap,
    Path(selection_id): Path<String>,
) -> Response
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    let user_id = match caller(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    match services.selections.delete_selection(&user_id, &selection_id) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": 1, "message": "Deleted successfully" })),
        )
            .into_response(),
        Err(error) => error_response(error, "An error occurred while deleting the selection"),
    }
}

pub(crate) async fn update_profile_handler<U, O, S, I>(
    State(services): State<Arc<PortalServices<U, O, S, I>>>,
    headers: HeaderMap,
    Json(update): Json<ProfileUpdate>,
) -> Response
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    let user_id = match caller(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    match services.update_profile(&user_id, update) {
        Ok(record) => (
            StatusCode::OK,
            Json(json!({ "success": 1, "message": "Profile updated", "user": record })),
        )
            .into_response(),
        Err(error) => error_response(error, "An error occurred while updating the profile"),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentStatusQuery {
    #[serde(default)]
    pub(crate) enrolment_no: Option<String>,
    #[serde(default)]
    pub(crate) opening_id: Option<String>,
}

pub(crate) async fn student_status_handler<U, O, S, I>(
    State(services): State<Arc<PortalServices<U, O, S, I>>>,
    headers: HeaderMap,
    Query(query): Query<StudentStatusQuery>,
) -> Response
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    let user_id = match caller(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    let enrolment_no = query.enrolment_no.unwrap_or_default();

    match services
        .selections
        .student_status(&user_id, &enrolment_no, query.opening_id.as_deref())
    {
        Ok(status) => {
            let mut payload = serde_json::to_value(&status).unwrap_or_default();
            if let Some(object) = payload.as_object_mut() {
                object.insert("success".to_string(), json!(1));
            }
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error, "Error checking student status"),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppliedShortlistedQuery {
    #[serde(default)]
    pub(crate) opening_id: Option<String>,
}

pub(crate) async fn applied_shortlisted_handler<U, O, S, I>(
    State(services): State<Arc<PortalServices<U, O, S, I>>>,
    headers: HeaderMap,
    Query(query): Query<AppliedShortlistedQuery>,
) -> Response
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    let user_id = match caller(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    let opening_id = query.opening_id.unwrap_or_default();

    match services
        .selections
        .applied_and_shortlisted(&user_id, &opening_id)
    {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "success": 1,
                "applied": result.applied,
                "shortlisted": result.shortlisted,
            })),
        )
            .into_response(),
        Err(error) => error_response(error, "Error fetching students"),
    }
}
