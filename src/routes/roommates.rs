use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::{MatchError, MatchLifecycle};
use crate::models::{
    CreateMatchRequest, ErrorResponse, HealthResponse, MatchStatus, RespondMatchRequest,
    SearchQuery, SearchResponse, UpsertProfileRequest, UserQuery,
};
use crate::services::{Notifier, PostgresClient};

/// The lifecycle manager as wired in production
pub type Lifecycle = MatchLifecycle<PostgresClient, Notifier>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub lifecycle: Arc<Lifecycle>,
}

/// Configure all roommate-matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check)).service(
        web::scope("/roommates")
            .route("/profile", web::get().to(get_profile))
            .route("/profile", web::post().to(upsert_profile))
            .route("/profile", web::delete().to(delete_profile))
            .route("/search", web::get().to(search))
            .route("/matches", web::get().to(list_matches))
            .route("/matches/{user_id}", web::post().to(create_match))
            .route("/matches/{match_id}", web::put().to(respond_match))
            .route("/matches/{match_id}", web::delete().to(delete_match)),
    );
}

fn error_response(e: &MatchError) -> HttpResponse {
    if let MatchError::Store(inner) = e {
        tracing::error!("Storage error: {}", inner);
    }

    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(ErrorResponse {
        error: e.kind().to_string(),
        message: e.to_string(),
        status_code: e.status_code(),
    })
}

fn validation_response(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "validation_failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Fetch the caller's preference profile
///
/// GET /api/v1/roommates/profile?userId={userId}
async fn get_profile(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    match state.lifecycle.get_profile(query.user_id).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => error_response(&e),
    }
}

/// Create-or-replace the caller's preference profile
///
/// POST /api/v1/roommates/profile
async fn upsert_profile(
    state: web::Data<AppState>,
    req: web::Json<UpsertProfileRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!(user_id = %req.user_id, "Profile validation failed: {}", errors);
        return validation_response(errors);
    }
    if req.budget_inverted() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: "budgetMin must not exceed budgetMax".to_string(),
            status_code: 400,
        });
    }

    match state.lifecycle.upsert_profile(&req).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => error_response(&e),
    }
}

/// Withdraw the caller's profile from matching (soft delete)
///
/// DELETE /api/v1/roommates/profile?userId={userId}
async fn delete_profile(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    match state.lifecycle.withdraw_profile(query.user_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

/// Filterable, ranked candidate search
///
/// GET /api/v1/roommates/search?userId={userId}&university=...&limit=20&offset=0
async fn search(state: web::Data<AppState>, query: web::Query<SearchQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_response(errors);
    }

    let limit = query.limit.min(crate::core::MAX_SEARCH_LIMIT);

    match state.lifecycle.search(&query).await {
        Ok(candidates) => HttpResponse::Ok().json(SearchResponse {
            candidates,
            limit,
            offset: query.offset,
        }),
        Err(e) => error_response(&e),
    }
}

/// List the caller's sent and received match requests
///
/// GET /api/v1/roommates/matches?userId={userId}
async fn list_matches(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    match state.lifecycle.list_matches(query.user_id).await {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => error_response(&e),
    }
}

/// Send a match request to another user
///
/// POST /api/v1/roommates/matches/{userId}
///
/// Request body:
/// ```json
/// {
///   "userId": "requester uuid",
///   "message": "optional intro text"
/// }
/// ```
async fn create_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<CreateMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_response(errors);
    }

    let target_id = path.into_inner();

    match state
        .lifecycle
        .create_request(req.user_id, target_id, req.message.clone())
        .await
    {
        Ok(record) => HttpResponse::Created().json(record),
        Err(e) => error_response(&e),
    }
}

/// Respond to a pending match request
///
/// PUT /api/v1/roommates/matches/{matchId}
///
/// Request body:
/// ```json
/// {
///   "userId": "responder uuid",
///   "status": "accepted|rejected"
/// }
/// ```
async fn respond_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<RespondMatchRequest>,
) -> impl Responder {
    let decision = match req.status.to_lowercase().as_str() {
        "accepted" => MatchStatus::Accepted,
        "rejected" => MatchStatus::Rejected,
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_decision".to_string(),
                message: "Status must be either accepted or rejected".to_string(),
                status_code: 400,
            });
        }
    };

    match state
        .lifecycle
        .respond(req.user_id, path.into_inner(), decision)
        .await
    {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(e) => error_response(&e),
    }
}

/// Withdraw or remove a match request
///
/// DELETE /api/v1/roommates/matches/{matchId}?userId={userId}
async fn delete_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    match state
        .lifecycle
        .withdraw_request(query.user_id, path.into_inner())
        .await
    {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}
