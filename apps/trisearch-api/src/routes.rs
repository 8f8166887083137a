use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use trisearch_domain::{filter::FilterSet, identity::IdentityContext};
use trisearch_service::{Error, SearchMode, SearchRequest, SearchResponse};

use crate::state::AppState;

pub const HEADER_TENANT_ID: &str = "X-Tenant-Id";
pub const HEADER_USER_ID: &str = "X-User-Id";
pub const HEADER_GROUPS: &str = "X-Groups";
pub const HEADER_PROJECT_ID: &str = "X-Project-Id";

#[derive(Debug, Deserialize)]
pub struct SearchBody {
	pub query: String,
	#[serde(default)]
	pub limit: Option<i64>,
	#[serde(default)]
	pub filters: FilterSet,
	#[serde(default)]
	pub mode: SearchMode,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}

	fn invalid_header(header: &str, message: impl Into<String>) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "INVALID_QUERY", message, Some(vec![header.to_string()]))
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidQuery { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "INVALID_QUERY", message, None),
			Error::RecordStore { message } =>
				ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE", message, None),
			Error::Config { message } =>
				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message, None),
		}
	}
}
impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		ApiError::new(StatusCode::BAD_REQUEST, "INVALID_QUERY", rejection.body_text(), None)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", post(search))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let identity = identity_from_headers(&headers)?;
	let Json(payload) = payload?;
	// Out-of-range limits are clamped into values the orchestrator rejects.
	let limit = payload.limit.map(|limit| u32::try_from(limit.max(0)).unwrap_or(u32::MAX));
	let request = SearchRequest {
		query: payload.query,
		identity,
		limit,
		filters: payload.filters,
		mode: payload.mode,
	};
	let response = state.search.search(request).await?;

	Ok(Json(response))
}

fn identity_from_headers(headers: &HeaderMap) -> Result<IdentityContext, ApiError> {
	let tenant_id = header_str(headers, HEADER_TENANT_ID)?.unwrap_or_default();

	if tenant_id.trim().is_empty() {
		return Err(ApiError::invalid_header(HEADER_TENANT_ID, "X-Tenant-Id header is required."));
	}

	let user_id = header_str(headers, HEADER_USER_ID)?.unwrap_or_default();
	let groups = header_str(headers, HEADER_GROUPS)?
		.map(|raw| raw.split(',').map(str::to_string).collect::<Vec<_>>())
		.unwrap_or_default();
	let mut identity = IdentityContext::new(tenant_id, user_id).with_groups(groups);

	if let Some(project_id) = header_str(headers, HEADER_PROJECT_ID)? {
		identity = identity.with_project(project_id);
	}

	Ok(identity)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ApiError> {
	let Some(value) = headers.get(name) else {
		return Ok(None);
	};

	value
		.to_str()
		.map(Some)
		.map_err(|_| ApiError::invalid_header(name, format!("{name} header must be visible ASCII.")))
}
