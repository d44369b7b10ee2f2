use std::sync::Arc;

use webagency_api::agents::{AgentManager, AgentStores, TextGenerator};
use webagency_api::api::{build_router, AppState};
use webagency_api::config::AppConfig;
use webagency_api::domain::repositories::{
    ArtifactStore, FeedbackRepository, InteractionRepository, KnowledgeRepository,
    ProjectRepository, SnapshotStore,
};
use webagency_api::infrastructure::database;
use webagency_api::infrastructure::repositories::{
    SqliteFeedbackRepository, SqliteInteractionRepository, SqliteKnowledgeRepository,
    SqliteProjectRepository,
};
use webagency_api::infrastructure::{FileSnapshotStore, FsArtifactStore, OllamaClient};
use webagency_api::workflow::{WorkflowDeps, WorkflowRegistry};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().expect("Invalid configuration");
    let pipeline = Arc::new(config.pipeline.clone());

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connected successfully");

    let projects: Arc<dyn ProjectRepository> = Arc::new(SqliteProjectRepository::new(pool.clone()));
    let interactions: Arc<dyn InteractionRepository> =
        Arc::new(SqliteInteractionRepository::new(pool.clone()));
    let feedback: Arc<dyn FeedbackRepository> = Arc::new(SqliteFeedbackRepository::new(pool.clone()));
    let knowledge: Arc<dyn KnowledgeRepository> = Arc::new(SqliteKnowledgeRepository::new(pool));
    let artifacts: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(&config.data_dir));
    let snapshots: Arc<dyn SnapshotStore> = Arc::new(FileSnapshotStore::new(&config.data_dir));

    let backend: Arc<dyn TextGenerator> = Arc::new(OllamaClient::new(&config.ollama_url));
    let agents = Arc::new(AgentManager::new(
        pipeline.clone(),
        backend,
        AgentStores {
            projects: projects.clone(),
            interactions,
            feedback,
            knowledge: knowledge.clone(),
            artifacts: artifacts.clone(),
        },
        config.worker_timeout,
    ));

    if config.bootstrap_agents {
        match agents.ensure_agents_exist(&config.modelfiles_dir).await {
            Ok(report) => tracing::info!(
                existing = report.existing.len(),
                created = report.created.len(),
                failed = report.failed.len(),
                "Agent bootstrap finished"
            ),
            Err(e) => tracing::warn!(error = %e, "Agent bootstrap skipped, backend unavailable"),
        }
    }

    let workflows = WorkflowRegistry::new(WorkflowDeps {
        executor: agents.executor(),
        projects: projects.clone(),
        snapshots,
        pipeline: pipeline.clone(),
        step_delay: config.step_delay,
    });

    let app = build_router(AppState {
        projects,
        knowledge,
        artifacts,
        agents,
        workflows: workflows.clone(),
        pipeline,
    });

    // Start server
    tracing::info!("Server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");

    // Let running pipelines reach a step boundary and persist
    workflows.shutdown().await;
    tracing::info!("Shutdown complete");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
