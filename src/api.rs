// 🌐 HTTP Shell - REST API with Axum
// Thin JSON wrapper over the pure validators. Not-ok validations map to 422.

use crate::bank::{validate_bank, BankInput, BankValidationResult};
use crate::card::{validate_card, CardInput, CardValidationResult};
use crate::pricing::{price_bundle, BundleItem, BundlePriceResult};
use crate::session::{should_keep_alive, InMemoryKeepAlive, KeepAliveStore};
use crate::speech::{
    articulate_digits, expand_state_abbrev, sanitize_speech, speak_amount, speak_card_ending,
    speak_reasons,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Read back when a request body can't be parsed at all
const UNREADABLE_SPEAK: &str = "I'm sorry, I didn't catch those details. Could you repeat them?";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub keep_alive: Arc<dyn KeepAliveStore>,
}

impl AppState {
    pub fn new(keep_alive: Arc<dyn KeepAliveStore>) -> Self {
        Self { keep_alive }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryKeepAlive::new()))
    }
}

// ============================================================================
// Request / Response types
// ============================================================================

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    /// Sentence the voice agent may read to the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speak: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            speak: None,
            error: None,
        }
    }

    pub fn rejected(data: T, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data,
            speak: None,
            error: Some(error.into()),
        }
    }

    pub fn with_speak(mut self, speak: impl Into<String>) -> Self {
        self.speak = Some(speak.into());
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct BundleRequest {
    #[serde(default)]
    pub items: Vec<BundleItem>,
}

#[derive(Debug, Deserialize)]
pub struct StateRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct DigitsRequest {
    pub input: String,
}

#[derive(Debug, Deserialize)]
pub struct SanitizeRequest {
    pub text: String,
}

/// `data` for a bundle request whose body couldn't be read
#[derive(Debug, Serialize, Deserialize)]
pub struct RejectedRequest {
    pub ok: bool,
    pub reasons: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeepAliveRequest {
    #[serde(default)]
    pub engaged: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeepAliveResponse {
    pub session_id: String,
    pub granted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReleaseResponse {
    pub session_id: String,
    pub released: bool,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

fn rejection_reason(rejection: &JsonRejection) -> String {
    format!("invalid request: {}", rejection.body_text())
}

/// Body problems (wrong types, bad JSON) come back as reasons, still 422
fn reject_body<T: Serialize>(data: T, rejection: &JsonRejection) -> Response {
    warn!(status = %rejection.status(), "Rejected request body: {}", rejection.body_text());

    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::rejected(data, "invalid request body").with_speak(UNREADABLE_SPEAK)),
    )
        .into_response()
}

/// POST /api/validate/card
async fn validate_card_handler(payload: Result<Json<CardInput>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(input)) => card_response(validate_card(&input)),
        Err(rejection) => {
            let result = CardValidationResult {
                ok: false,
                reasons: vec![rejection_reason(&rejection)],
                brand: None,
                last_four: None,
            };
            reject_body(result, &rejection)
        }
    }
}

fn card_response(result: CardValidationResult) -> Response {
    if result.ok {
        let brand = result.brand.map(|b| b.display_name()).unwrap_or("card");
        let ending = result
            .last_four
            .as_deref()
            .map(speak_card_ending)
            .unwrap_or_default();
        let speak = format!("Thanks, your {} {} checks out.", brand, ending)
            .replace("  ", " ");

        (StatusCode::OK, Json(ApiResponse::ok(result).with_speak(speak))).into_response()
    } else {
        info!(reasons = result.reasons.len(), "Card validation failed");
        let speak = speak_reasons(false, &result.reasons);

        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::rejected(result, "card validation failed").with_speak(speak)),
        )
            .into_response()
    }
}

/// POST /api/validate/bank
async fn validate_bank_handler(payload: Result<Json<BankInput>, JsonRejection>) -> Response {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            let result = BankValidationResult {
                ok: false,
                reasons: vec![rejection_reason(&rejection)],
            };
            return reject_body(result, &rejection);
        }
    };

    let result: BankValidationResult = validate_bank(&input);
    let speak = speak_reasons(result.ok, &result.reasons);

    if result.ok {
        (StatusCode::OK, Json(ApiResponse::ok(result).with_speak(speak))).into_response()
    } else {
        info!(reasons = result.reasons.len(), "Bank validation failed");
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::rejected(result, "bank validation failed").with_speak(speak)),
        )
            .into_response()
    }
}

/// POST /api/bundle/price
async fn price_bundle_handler(payload: Result<Json<BundleRequest>, JsonRejection>) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let data = RejectedRequest {
                ok: false,
                reasons: vec![rejection_reason(&rejection)],
            };
            return reject_body(data, &rejection);
        }
    };

    let result: BundlePriceResult = price_bundle(&req.items);

    let mut speak = format!("Your total comes to {}", speak_amount(result.total));
    if result.discount_pct > 0.0 {
        let pct = (result.discount_pct * 100.0).round() as u32;
        speak.push_str(&format!(" after a {} percent bundle discount", pct));
    }
    speak.push('.');

    Json(ApiResponse::ok(result).with_speak(speak)).into_response()
}

/// POST /api/speech/state
async fn state_handler(Json(req): Json<StateRequest>) -> impl IntoResponse {
    Json(ApiResponse::ok(TextResponse {
        text: expand_state_abbrev(&req.code),
    }))
}

/// POST /api/speech/digits
async fn digits_handler(Json(req): Json<DigitsRequest>) -> impl IntoResponse {
    Json(ApiResponse::ok(TextResponse {
        text: articulate_digits(&req.input),
    }))
}

/// POST /api/speech/sanitize
async fn sanitize_handler(Json(req): Json<SanitizeRequest>) -> impl IntoResponse {
    Json(ApiResponse::ok(TextResponse {
        text: sanitize_speech(&req.text),
    }))
}

/// POST /api/sessions/:id/keep-alive
async fn keep_alive_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<KeepAliveRequest>,
) -> impl IntoResponse {
    let granted = should_keep_alive(state.keep_alive.as_ref(), &session_id, req.engaged);

    Json(ApiResponse::ok(KeepAliveResponse {
        session_id,
        granted,
    }))
}

/// DELETE /api/sessions/:id/keep-alive
async fn release_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let released = state.keep_alive.release(&session_id);

    Json(ApiResponse::ok(ReleaseResponse {
        session_id,
        released,
    }))
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/validate/card", post(validate_card_handler))
        .route("/validate/bank", post(validate_bank_handler))
        .route("/bundle/price", post(price_bundle_handler))
        .route("/speech/state", post(state_handler))
        .route("/speech/digits", post(digits_handler))
        .route("/speech/sanitize", post(sanitize_handler))
        .route(
            "/sessions/:id/keep-alive",
            post(keep_alive_handler).delete(release_handler),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
