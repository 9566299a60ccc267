use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracker_model::{Project, ProjectTask, TimeRecord, User};
use tracker_store::{config::read_config, migrate, EntityRepository, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = read_config().context("failed to read configuration")?;
    tracing::info!(
        host = %settings.database.host,
        database = %settings.database.database_name,
        "connecting to database"
    );

    let pool = settings
        .database
        .pool_options()
        .connect_with(settings.database.with_db())
        .await
        .context("failed to connect to database")?;

    migrate(&pool).await.context("failed to run migrations")?;
    tracing::info!("migrations applied");

    let store = PgStore::new(pool);
    let projects = EntityRepository::<Project>::list(&store).await?.len();
    let tasks = EntityRepository::<ProjectTask>::list(&store).await?.len();
    let users = EntityRepository::<User>::list(&store).await?.len();
    let records = EntityRepository::<TimeRecord>::list(&store).await?.len();
    tracing::info!(projects, tasks, users, records, "store ready");

    Ok(())
}
