//! # API REST
//!
//! REST API implementation for Paeon.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, API key header)
//!
//! Uses `api-shared` for request and response types. Services are built once at startup and
//! shared through [`AppState`].

#![warn(rust_2018_idioms)]

use api_shared::auth::{validate_api_key, API_KEY_HEADER};
use api_shared::{
    DrugBalanceRes, FeedbackReq, FeedbackRes, HealthRes, HealthService, QuickTranslateReq,
    QuickTranslateRes, RedactReq, RedactRes, ScoreBalanceReq, ScoreBalanceRes, StandardCode,
    SupportedLanguageRes, TranslateReq, TranslateRes,
};
use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use paeon_core::balance::BalanceService;
use paeon_core::language::supported_languages;
use paeon_core::translation::{TranslationRequest, TranslationService};
use paeon_core::validation::validate_symptom_text;
use paeon_core::PaeonError;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

/// Header identifying the calling clinician or system. Only its salted hash is audited.
pub const ACTOR_HEADER: &str = "x-actor-id";

const MAX_CORRECTION_CHARS: usize = 1_000;

type ApiError = (StatusCode, String);

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub translation: Arc<TranslationService>,
    pub balance: Arc<BalanceService>,
    /// Expected `x-api-key` value. `None` leaves the API open.
    pub api_key: Option<Arc<str>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        translate,
        supported_languages_list,
        quick_translate,
        submit_feedback,
        score_balance,
        drug_balance,
        redact,
    ),
    components(schemas(
        HealthRes,
        StandardCode,
        TranslateReq,
        TranslateRes,
        QuickTranslateReq,
        QuickTranslateRes,
        SupportedLanguageRes,
        FeedbackReq,
        FeedbackRes,
        ScoreBalanceReq,
        ScoreBalanceRes,
        DrugBalanceRes,
        RedactReq,
        RedactRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI at `/swagger-ui`.
///
/// Every route except `/health` and the docs requires the API key when one is configured.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/slang/translate", post(translate))
        .route("/slang/languages", get(supported_languages_list))
        .route("/slang/quick-translate", post(quick_translate))
        .route("/slang/translations/:id/feedback", post(submit_feedback))
        .route("/balance/score", post(score_balance))
        .route("/balance/drugs/:name", get(drug_balance))
        .route("/pii/redact", post(redact))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = &state.api_key {
        let provided = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if let Err(e) = validate_api_key(provided, expected) {
            tracing::warn!(path = %request.uri().path(), error = %e, "rejected request");
            return Err((StatusCode::UNAUTHORIZED, e.to_string()));
        }
    }
    Ok(next.run(request).await)
}

fn actor_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(ACTOR_HEADER).and_then(|v| v.to_str().ok())
}

fn map_core_error(e: PaeonError) -> ApiError {
    if e.is_input_error() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else {
        tracing::error!("request failed: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/slang/translate",
    request_body = TranslateReq,
    responses(
        (status = 200, description = "Clinical translation", body = TranslateRes),
        (status = 400, description = "Empty or oversized text, oversized context or bad session id"),
        (status = 401, description = "Missing or invalid API key")
    )
)]
/// Translate patient language into clinical terminology
///
/// Detects the input language, strips PII, and maps the description to SNOMED-CT and ICD-10
/// codes. This is not a diagnostic tool: output is checked by the safety guardrail.
async fn translate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TranslateReq>,
) -> Result<Json<TranslateRes>, ApiError> {
    let request = TranslationRequest {
        text: req.text,
        context: req.context,
        session_id: req.session_id,
        actor_id: actor_id(&headers).map(str::to_string),
    };
    let result = state
        .translation
        .translate(&request)
        .await
        .map_err(map_core_error)?;
    Ok(Json(result.into()))
}

#[utoipa::path(
    get,
    path = "/slang/languages",
    responses(
        (status = 200, description = "Supported input languages", body = Vec<SupportedLanguageRes>)
    )
)]
/// List supported input languages
async fn supported_languages_list() -> Json<Vec<SupportedLanguageRes>> {
    Json(supported_languages().iter().map(Into::into).collect())
}

#[utoipa::path(
    post,
    path = "/slang/quick-translate",
    request_body = QuickTranslateReq,
    responses(
        (status = 200, description = "Compact translation", body = QuickTranslateRes),
        (status = 400, description = "Empty or oversized text")
    )
)]
/// Simplified translation for demos
async fn quick_translate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<QuickTranslateReq>,
) -> Result<Json<QuickTranslateRes>, ApiError> {
    let mut request = TranslationRequest::new(req.text);
    request.actor_id = actor_id(&headers).map(str::to_string);
    let result = state
        .translation
        .translate(&request)
        .await
        .map_err(map_core_error)?;
    Ok(Json(result.into()))
}

#[utoipa::path(
    post,
    path = "/slang/translations/{id}/feedback",
    request_body = FeedbackReq,
    params(("id" = String, Path, description = "Translation id")),
    responses(
        (status = 200, description = "Feedback acknowledged", body = FeedbackRes),
        (status = 400, description = "Invalid translation id or correction too long")
    )
)]
/// Submit clinician feedback on a translation
///
/// Feedback is acknowledged and logged; it is not persisted.
async fn submit_feedback(
    Path(id): Path<String>,
    Json(req): Json<FeedbackReq>,
) -> Result<Json<FeedbackRes>, ApiError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid translation id".to_string()))?;
    if let Some(correction) = &req.correction {
        if correction.chars().count() > MAX_CORRECTION_CHARS {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("correction exceeds {MAX_CORRECTION_CHARS} characters"),
            ));
        }
    }

    tracing::info!(
        translation_id = %id,
        approved = req.approved,
        corrected = req.correction.is_some(),
        "clinician feedback"
    );
    Ok(Json(FeedbackRes {
        status: "success".into(),
        message: "Feedback recorded".into(),
        translation_id: id.to_string(),
        approved: req.approved,
    }))
}

#[utoipa::path(
    post,
    path = "/balance/score",
    request_body = ScoreBalanceReq,
    responses(
        (status = 200, description = "Fair-balance assessment", body = ScoreBalanceRes)
    )
)]
/// Score drug education content for fair balance
async fn score_balance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ScoreBalanceReq>,
) -> Json<ScoreBalanceRes> {
    let input = req.into();
    let assessment = state.balance.score(&input, actor_id(&headers), None);
    Json(assessment.into())
}

#[derive(Debug, Deserialize)]
struct DrugBalanceQuery {
    include_boxed_warning: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/balance/drugs/{name}",
    params(
        ("name" = String, Path, description = "Generic or brand drug name"),
        ("include_boxed_warning" = Option<bool>, Query, description = "Include the boxed warning (default true)")
    ),
    responses(
        (status = 200, description = "Score for the label's patient education content", body = DrugBalanceRes),
        (status = 404, description = "Unknown drug")
    )
)]
/// Score the patient education content built from a drug label
async fn drug_balance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Query(query): Query<DrugBalanceQuery>,
) -> Result<Json<DrugBalanceRes>, ApiError> {
    let include_boxed_warning = query.include_boxed_warning.unwrap_or(true);
    match state
        .balance
        .score_drug(&name, include_boxed_warning, actor_id(&headers))
        .await
    {
        Some(balance) => Ok(Json(balance.into())),
        None => Err((StatusCode::NOT_FOUND, format!("No label found for {name}"))),
    }
}

#[utoipa::path(
    post,
    path = "/pii/redact",
    request_body = RedactReq,
    responses(
        (status = 200, description = "Redacted text and report", body = RedactRes),
        (status = 400, description = "Empty or oversized text")
    )
)]
/// Redact PII from free text
async fn redact(
    State(state): State<AppState>,
    Json(req): Json<RedactReq>,
) -> Result<Json<RedactRes>, ApiError> {
    validate_symptom_text(&req.text, state.translation.max_input_chars())
        .map_err(map_core_error)?;
    let redactor = state.translation.redactor();
    let (redacted, report) = redactor.redact(&req.text);
    let masked = req
        .partial_mask
        .then(|| redactor.mask_partial(&req.text, '*'));
    Ok(Json(RedactRes::new(redacted, masked, report)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use http_body_util::BodyExt;
    use paeon_core::audit::MemoryAuditSink;
    use paeon_core::collaborators::SemanticMapper;
    use paeon_core::label::StaticLabelSource;
    use paeon_core::lexicon::Lexicon;
    use paeon_core::translation::Collaborators;
    use paeon_core::{CollaboratorResult, CoreConfig};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct FixedMapper;

    #[async_trait]
    impl SemanticMapper for FixedMapper {
        async fn map_symptom(&self, _text: &str) -> CollaboratorResult<String> {
            Ok("Tinnitus".into())
        }
    }

    fn state(api_key: Option<&str>) -> (AppState, Arc<MemoryAuditSink>) {
        let audit = Arc::new(MemoryAuditSink::new());
        let mut collaborators = Collaborators::offline("test");
        collaborators.mapper = Arc::new(FixedMapper);
        collaborators.audit = audit.clone();

        let cfg = CoreConfig::default();
        let translation =
            TranslationService::new(&cfg, Arc::new(Lexicon::curated()), collaborators);
        let balance = BalanceService::new(
            Arc::new(StaticLabelSource::with_defaults()),
            audit.clone(),
            cfg.audit_salt(),
        );
        let state = AppState {
            translation: Arc::new(translation),
            balance: Arc::new(balance),
            api_key: api_key.map(Arc::from),
        };
        (state, audit)
    }

    fn post_json(uri: &str, body: Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: Router, request: HttpRequest<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    #[tokio::test]
    async fn health_is_open() {
        let (state, _) = state(Some("secret"));
        let (status, body) = send(router(state), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn translate_returns_clinical_mapping() {
        let (state, audit) = state(None);
        let (status, body) = send(
            router(state),
            post_json(
                "/slang/translate",
                json!({
                    "text": "Mr. John Smith says my heart feels funny, call 9876543210",
                    "session_id": "sess_abc123"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["clinical_interpretation"], "Palpitations");
        assert_eq!(body["standard_codes"][0]["system"], "SNOMED-CT");
        assert_eq!(body["standard_codes"][0]["code"], "80313002");
        assert_eq!(body["standard_codes"][1]["code"], "R00.2");
        assert_eq!(body["provenance"], "curated");
        assert_eq!(body["pii_detected"], true);
        assert_eq!(body["session_id"], "sess_abc123");
        assert!(!body["raw_input"].as_str().unwrap().contains("John"));
        assert_eq!(audit.records().len(), 1);
    }

    #[tokio::test]
    async fn translate_rejects_blank_and_oversized_text() {
        let (state, audit) = state(None);
        let app = router(state);

        let (status, _) = send(app.clone(), post_json("/slang/translate", json!({"text": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let long = "a".repeat(2_001);
        let (status, _) = send(app, post_json("/slang/translate", json!({"text": long}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(audit.records().is_empty());
    }

    #[tokio::test]
    async fn quick_translate_reports_percent() {
        let (state, _) = state(None);
        let (status, body) = send(
            router(state),
            post_json("/slang/quick-translate", json!({"text": "my ears are ringing all day"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["clinical"], "Tinnitus");
        assert_eq!(body["confidence"], 75);
        assert_eq!(body["language"], "English");
    }

    #[tokio::test]
    async fn lists_supported_languages() {
        let (state, _) = state(None);
        let (status, body) = send(router(state), get("/slang/languages")).await;
        assert_eq!(status, StatusCode::OK);
        let langs = body.as_array().unwrap();
        assert_eq!(langs.len(), 20);
        assert!(langs.iter().any(|l| l["code"] == "hi" && l["name"] == "Hindi"));
    }

    #[tokio::test]
    async fn feedback_requires_uuid() {
        let (state, _) = state(None);
        let app = router(state);
        let id = Uuid::new_v4();

        let (status, body) = send(
            app.clone(),
            post_json(
                &format!("/slang/translations/{id}/feedback"),
                json!({"approved": false, "correction": "Chest Tightness"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["translation_id"], id.to_string());
        assert_eq!(body["approved"], false);

        let (status, _) = send(
            app,
            post_json("/slang/translations/not-a-uuid/feedback", json!({"approved": true})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn scores_balance() {
        let (state, audit) = state(None);
        let (status, body) = send(
            router(state),
            post_json(
                "/balance/score",
                json!({
                    "benefits": ["Helps control blood sugar levels", "Reduces risk of diabetes complications"],
                    "risks": ["May cause nausea"],
                    "disclaimer": "Consult your healthcare provider."
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["compliant"], false);
        assert_eq!(
            body["note"],
            "Increase risk/safety information for Fair Balance compliance"
        );
        assert_eq!(audit.records().len(), 1);
    }

    #[tokio::test]
    async fn scores_drug_label_or_404() {
        let (state, _) = state(None);
        let app = router(state);

        let (status, body) = send(app.clone(), get("/balance/drugs/Ozempic")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generic_name"], "Semaglutide");
        assert!(body["boxed_warning"].is_string());

        let (status, body) = send(
            app.clone(),
            get("/balance/drugs/ozempic?include_boxed_warning=false"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["boxed_warning"].is_null());

        let (status, _) = send(app, get("/balance/drugs/aspirin")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn redacts_with_optional_mask() {
        let (state, _) = state(None);
        let (status, body) = send(
            router(state),
            post_json(
                "/pii/redact",
                json!({"text": "call 9876543210 today", "partial_mask": true}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["redacted"], "call [PHONE_REDACTED] today");
        assert_eq!(body["masked"], "call ******3210 today");
        assert_eq!(body["categories"], json!(["phone_india"]));
    }

    #[tokio::test]
    async fn api_key_is_enforced_when_configured() {
        let (state, _) = state(Some("secret"));
        let app = router(state);

        let (status, _) = send(app.clone(), get("/slang/languages")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = HttpRequest::builder()
            .uri("/slang/languages")
            .header(API_KEY_HEADER, "secret")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
    }
}
