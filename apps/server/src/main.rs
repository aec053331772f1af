use anyhow::Context;
use clap::{Parser, Subcommand};
use nestboard_auth::{AuthError, Authenticator};
use nestboard_config::{load as load_config, AppConfig};
use nestboard_db::{initialize_database, ListingRepository, NewListing};
use nestboard_web::{build_router, AppState};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tracing::info;

mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Parser)]
#[command(name = "nestboard")]
#[command(about = "Nestboard listing site (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Seed the database with demo accounts and listings
    Seed,
}

struct Services {
    pool: SqlitePool,
    authenticator: Authenticator,
    listings: ListingRepository,
}

impl Services {
    async fn initialise(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;
        let authenticator = Authenticator::new(pool.clone(), config.auth.clone());
        let listings = ListingRepository::new(pool.clone());

        Ok(Self {
            pool,
            authenticator,
            listings,
        })
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Seed => seed_data().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting Nestboard");

    let config = load_config().context("failed to load configuration")?;
    let services = Services::initialise(&config).await?;

    let state = AppState::new(services.authenticator, services.listings, &config.auth);
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("server shut down");
    Ok(())
}

async fn seed_data() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("seeding database with demo data");

    let config = load_config().context("failed to load configuration")?;
    let services = Services::initialise(&config).await?;

    let demo_password = "demo-password";
    let mut seeded_listings = 0usize;

    for (username, listings) in [
        (
            "demo-host",
            vec![
                NewListing {
                    title: "Cozy Loft".into(),
                    location: "Berlin".into(),
                    technology: "Fiber".into(),
                    description: "Bright top-floor loft near the park.".into(),
                    price: 700,
                },
                NewListing {
                    title: "Canal Apartment".into(),
                    location: "Hamburg".into(),
                    technology: "Cable".into(),
                    description: "Two rooms with a view of the canal.".into(),
                    price: 850,
                },
            ],
        ),
        (
            "demo-guest",
            vec![NewListing {
                title: "Garden Studio".into(),
                location: "Munich".into(),
                technology: "DSL".into(),
                description: "Quiet studio with garden access.".into(),
                price: 500,
            }],
        ),
    ] {
        let user = match services
            .authenticator
            .register_with_password(username, demo_password)
            .await
        {
            Ok(user) => user,
            Err(AuthError::UserExists) => {
                println!("user '{username}' already exists, skipping");
                continue;
            }
            Err(error) => return Err(error).context("failed to seed user"),
        };

        for listing in listings {
            services
                .listings
                .create(user.id, listing)
                .await
                .context("failed to seed listing")?;
            seeded_listings += 1;
        }
        println!("seeded user '{username}' (password: {demo_password})");
    }

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings")
        .fetch_one(&services.pool)
        .await
        .context("failed to count listings")?;

    println!("seeded {seeded_listings} listings ({total} total in database)");
    Ok(())
}
