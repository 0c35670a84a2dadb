use clap::Parser;
use engine::MediaStore;
use migration::{Migrator, MigratorTrait};

mod settings;

#[derive(Debug, Parser)]
#[command(name = "staffbook", version, about = "Personnel records admin server")]
struct Args {
    /// Settings file name, without extension.
    #[arg(long, default_value = settings::DEFAULT_CONFIG_PATH)]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    let settings = settings::Settings::new(&args.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "staffbook={level},server={level},engine={level}",
            level = settings.log_level
        ))
        .init();

    tracing::info!("starting {}", settings.app_name);
    if settings.debug {
        tracing::warn!("DEBUG is enabled, do not run like this in production");
    }

    let db = parse_database(&settings.database_url).await?;
    let engine = engine::Engine::builder()
        .database(db)
        .phone_region(settings.phone_region()?)
        .default_status(settings.default_status.as_deref())
        .build()
        .await?;

    let media = MediaStore::new(&settings.media_root);
    tokio::fs::create_dir_all(media.root()).await?;

    let addr = format!("{}:{}", settings.bind, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    server::run_with_listener(engine, settings.site()?, media, listener).await?;

    Ok(())
}

async fn parse_database(
    url: &str,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::debug!("database ready, migrations applied");
    Ok(database)
}
