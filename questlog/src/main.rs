use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use questlog::api::{create_router, AppState};
use questlog::config::Config;
use questlog::llm::LlmProvider;
use questlog::notion::{NotionAdmin, NotionClient, NotionConnector};

#[derive(Parser)]
#[command(name = "questlog")]
#[command(about = "Life-gamification backend over a Notion workspace")]
struct Args {
    /// Generate one quest batch for this character and exit instead of serving
    #[arg(long)]
    user: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questlog=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.server.api_keys.is_empty() {
        tracing::warn!("QUESTLOG_API_KEYS is not set, protected API routes will reject all requests");
    }

    let admin_token = config
        .notion
        .admin_token
        .as_deref()
        .context("ADMIN_NOTION_TOKEN must be set")?;
    let users_db_id = config
        .notion
        .admin_users_db_id
        .as_deref()
        .context("ADMIN_USERS_DB_ID must be set")?;

    tracing::info!("Connecting to admin workspace...");
    let admin_client = NotionClient::new(
        admin_token,
        &config.notion.base_url,
        config.notion.timeout_secs,
    )?;
    let admin = Arc::new(NotionAdmin::new(admin_client, users_db_id));
    let connector = Arc::new(NotionConnector::new(&config.notion));

    if let Some(reasoner) = &config.reasoner {
        tracing::info!("Initializing reasoner: {}...", reasoner.model);
    }
    let reasoner = LlmProvider::new(config.reasoner.as_ref());
    if let Some(formatter) = &config.formatter {
        tracing::info!("Initializing formatter: {}...", formatter.model);
    }
    let formatter = LlmProvider::new(config.formatter.as_ref());
    let llm_ready = reasoner.is_available() && formatter.is_available();
    if !llm_ready {
        tracing::warn!(
            "LLM unavailable - quest generation and insights will fail, reflection uses fallback questions"
        );
    }

    let state = AppState::new(config.clone(), admin, connector, reasoner, formatter);

    if let Some(name) = args.user {
        let generated = state.quests.generate_for_user(&name).await?;
        for quest in &generated.quests {
            tracing::info!(kind = %quest.kind, title = %quest.title, "Quest saved");
        }
        tracing::info!(user = %name, count = generated.quests.len(), "Quest generation finished");
        return Ok(());
    }

    let cancel_token = CancellationToken::new();

    if llm_ready {
        tracing::info!(
            "Starting quest refresh manager... (interval={}s, min_active={})",
            state.config.quests.check_interval_secs,
            state.config.quests.min_active_quests
        );
        tokio::spawn(state.quest_refresh().run(cancel_token.child_token()));
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Questlog starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
