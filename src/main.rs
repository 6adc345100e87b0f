use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use api_shared::auth::api_key_from_env;
use paeon_core::{
    BalanceService, Collaborators, CoreConfig, Lexicon, StaticLabelSource, TracingAuditSink,
    TranslationService, language::WhatlangDetector,
};
use paeon_llm::{GeminiConfig, language_models};

/// Main entry point for the Paeon service
///
/// Resolves configuration once, builds the translation and balance services, and serves the
/// REST API with OpenAPI/Swagger UI.
///
/// # Environment Variables
/// - `PAEON_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PAEON_*`: pipeline settings, see `paeon_core::config::env`
/// - `GEMINI_API_KEY`, `GEMINI_MODEL`: language model access (optional)
/// - `API_KEY`: required `x-api-key` header value (optional)
///
/// # Errors
/// Returns an error if configuration or the lexicon file is invalid, or the server address
/// cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("paeon=info".parse()?)
                .add_directive("paeon_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env()?;
    let lexicon = Arc::new(Lexicon::load(cfg.lexicon_path())?);
    tracing::info!(entries = lexicon.len(), "lexicon loaded");

    let (adapter, mapper) = language_models(GeminiConfig::from_env()?);
    let audit = Arc::new(TracingAuditSink);
    let collaborators = Collaborators {
        detector: Arc::new(WhatlangDetector::new()),
        adapter,
        mapper,
        audit: audit.clone(),
    };

    let translation = TranslationService::new(&cfg, lexicon, collaborators);
    let balance = BalanceService::new(
        Arc::new(StaticLabelSource::with_defaults()),
        audit,
        cfg.audit_salt(),
    );

    let api_key = api_key_from_env();
    if api_key.is_none() {
        tracing::warn!("API_KEY not set; REST API is open");
    }

    let app = router(AppState {
        translation: Arc::new(translation),
        balance: Arc::new(balance),
        api_key: api_key.map(Arc::from),
    });

    let rest_addr = std::env::var("PAEON_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    tracing::info!("++ Starting Paeon REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
