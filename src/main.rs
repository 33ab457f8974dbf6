use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;
use task_auth::configuration::{get_configuration, DatabaseSettings, TelemetrySettings};
use task_auth::startup::{build_auth, run};
use task_auth::store::{CredentialStore, InMemoryStore, PgStore, TaskStore};
use task_auth::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            init_telemetry(&TelemetrySettings::default());
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    init_telemetry(&configuration.telemetry);
    tracing::info!("Configuration loaded successfully");

    let (credentials, tasks) = build_stores(&configuration.database).await?;

    let (auth, verifier) =
        build_auth(&configuration.jwt, &configuration.hashing, credentials).map_err(|e| {
            tracing::error!("Failed to initialise authentication: {}", e);
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
        })?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    run(listener, auth, verifier, tasks)?.await
}

async fn build_stores(
    database: &DatabaseSettings,
) -> std::io::Result<(Arc<dyn CredentialStore>, Arc<dyn TaskStore>)> {
    if database.in_memory {
        tracing::warn!("Using in-memory store; data is lost on restart");
        let store = Arc::new(InMemoryStore::new());
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let tasks: Arc<dyn TaskStore> = store;
        return Ok((credentials, tasks));
    }

    tracing::info!("Attempting to connect to database");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
    })?;

    tracing::info!("Database connection pool created successfully");
    let store = Arc::new(PgStore::new(pool));
    let credentials: Arc<dyn CredentialStore> = store.clone();
    let tasks: Arc<dyn TaskStore> = store;
    Ok((credentials, tasks))
}
