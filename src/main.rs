use std::sync::Arc;

use anyhow::Context;

use email_triage::config::AppConfig;
use email_triage::pipeline::classifier::Classifier;
use email_triage::web;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Optional .env next to the binary; real environment wins.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    let classifier = Classifier::from_config(&config).context("Failed to create LLM provider")?;
    if !classifier.is_configured() {
        tracing::warn!(
            var = config.backend.api_key_var(),
            "LLM credential not set; every classification will fail until it is"
        );
    }

    eprintln!("📧 Email Triage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {} ({})", config.backend.name(), config.model);
    eprintln!("   LLM timeout: {}s", config.llm_timeout.as_secs());
    eprintln!("   Form: http://0.0.0.0:{}/", config.port);
    eprintln!("   API:  http://0.0.0.0:{}/process\n", config.port);

    let app = web::routes(Arc::new(classifier));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Server started");
    axum::serve(listener, app).await?;

    Ok(())
}
