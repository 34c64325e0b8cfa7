use anyhow::Context;
use tankobon::{
    config::Config,
    fixtures::{seed_large_catalog, seed_test_catalog},
    state::AppState,
    telemetry::{get_subscriber, init_subscriber},
};

/// Fills the configured database with seed data. Without arguments the
/// fixed demo catalog goes in; `--large <scale>` generates a random
/// catalog of roughly `scale` manga instead.
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("tankobon-seed".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let config = Config::new().context("Failed to read configuration.")?;
    let state = AppState::init(config).await?;

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => {
            seed_test_catalog(&state.pool).await?;
            tracing::info!("Seeded the demo catalog.");
        }
        Some("--large") => {
            let scale = args
                .next()
                .context("--large takes a scale, e.g. --large 100")?
                .parse::<usize>()
                .context("--large takes a numeric scale")?;
            seed_large_catalog(&state.pool, scale).await?;
            tracing::info!("Seeded a random catalog at scale {}.", scale);
        }
        Some(other) => {
            anyhow::bail!("Unknown argument {}. Pass --large <scale> or nothing.", other);
        }
    }

    Ok(())
}
