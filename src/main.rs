use rusty_library_loans::{
    adapters::{
        mail::LogMailer,
        memory::InMemoryStore,
        postgres::{
            PostgresAuthorRepository, PostgresBookRepository, PostgresLoanRepository,
            PostgresMemberRepository,
        },
        queue::{ChannelTaskQueue, NotificationWorker, run_overdue_sweeper},
    },
    api::{handlers::AppState, router::create_router},
    application::{loan::ServiceDependencies, notification::NotificationDispatcher},
    config::AppConfig,
    ports::TaskQueue,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_library_loans=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Task queue (the receiving side goes to the worker)
    let (task_queue, receiver) = ChannelTaskQueue::new();
    let task_queue: Arc<dyn TaskQueue> = Arc::new(task_queue);

    // Initialize adapters
    let service_deps = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Using PostgreSQL storage");

            ServiceDependencies {
                authors: Arc::new(PostgresAuthorRepository::new(pool.clone())),
                books: Arc::new(PostgresBookRepository::new(pool.clone())),
                members: Arc::new(PostgresMemberRepository::new(pool.clone())),
                loans: Arc::new(PostgresLoanRepository::new(pool)),
                task_queue,
                policy: config.loan_policy(),
            }
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, using in-memory storage");
            let store = Arc::new(InMemoryStore::new());

            ServiceDependencies {
                authors: store.clone(),
                books: store.clone(),
                members: store.clone(),
                loans: store,
                task_queue,
                policy: config.loan_policy(),
            }
        }
    };

    // Background notification worker
    let dispatcher = NotificationDispatcher {
        books: service_deps.books.clone(),
        members: service_deps.members.clone(),
        loans: service_deps.loans.clone(),
        mailer: Arc::new(LogMailer::new()),
        from_address: config.mail_from.clone(),
    };
    let worker = NotificationWorker::new(Arc::new(dispatcher), config.worker_config());
    tokio::spawn(worker.run(receiver));

    // Periodic overdue sweep
    tokio::spawn(run_overdue_sweeper(
        service_deps.clone(),
        config.overdue_sweep_interval,
    ));

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
