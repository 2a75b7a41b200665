use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dogwatch_core::{
    load_config, validate_config, Config, DtddClient, LookupClient, Matcher, Pacer, PlexClient,
    RecordCache, RunMode, RunOptions, SanitizedConfig, SqliteRecordCache, SyncOrchestrator,
    Synchronizer,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Adds DoesTheDogDie.com content warnings to Plex movie summaries
#[derive(Parser, Debug)]
#[command(name = "dogwatch", version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "DOGWATCH_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Log the changes that would be made without writing them
    #[arg(long)]
    dry_run: bool,

    /// Remove warning blocks from every summary and exit
    #[arg(long)]
    clear: bool,

    /// Empty the lookup cache; exits afterwards unless --clear or --movie is given
    #[arg(long)]
    clear_cache: bool,

    /// Only process the movie with this title
    #[arg(long, value_name = "TITLE")]
    movie: Option<String>,

    /// Re-run every SECS seconds until interrupted (overrides config)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("dogwatch v{}", VERSION);

    // Load configuration
    info!("Loading configuration from {:?}", cli.config);
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration: {:?}", SanitizedConfig::from(&config));

    let plan = plan(&cli, &config);

    let cache = if plan.needs_cache() {
        Some(Arc::new(
            SqliteRecordCache::new(
                &config.cache.path,
                Duration::from_secs(config.cache.ttl_secs),
            )
            .with_context(|| format!("Failed to open cache at {:?}", config.cache.path))?,
        ))
    } else {
        None
    };

    if plan.clear_cache {
        if let Some(cache) = &cache {
            let removed = cache.clear().context("Failed to clear cache")?;
            info!("Cleared {} cached lookup(s)", removed);
        }
    }

    let Some(options) = plan.run else {
        return Ok(());
    };
    if plan.interval_ignored {
        warn!("Ignoring interval: periodic runs only apply to full sync");
    }

    let orchestrator = build_orchestrator(&config, options.mode, cache)?;
    match plan.interval {
        Some(every) => {
            run_periodically(&orchestrator, &options, every).await;
        }
        None => {
            orchestrator.run(&options).await?;
        }
    }
    Ok(())
}

/// What one invocation does, decided from flags and config alone.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Plan {
    clear_cache: bool,
    /// `None` when the invocation only clears the cache.
    run: Option<RunOptions>,
    /// Delay between periodic runs.
    interval: Option<Duration>,
    /// An interval is configured but this run does not repeat.
    interval_ignored: bool,
}

impl Plan {
    fn needs_cache(&self) -> bool {
        self.clear_cache || matches!(&self.run, Some(o) if o.mode == RunMode::Sync)
    }
}

fn plan(cli: &Cli, config: &Config) -> Plan {
    let cache_only = cli.clear_cache && !cli.clear && cli.movie.is_none();
    let mode = if cli.clear {
        RunMode::Clear
    } else {
        RunMode::Sync
    };

    let configured = cli.interval.or(config.sync.interval_secs);
    let repeats = !cache_only && mode == RunMode::Sync && cli.movie.is_none();
    let interval = configured.filter(|_| repeats).map(Duration::from_secs);

    Plan {
        clear_cache: cli.clear_cache,
        run: (!cache_only).then(|| RunOptions {
            mode,
            dry_run: cli.dry_run || config.sync.dry_run,
            only_title: cli.movie.clone(),
        }),
        interval,
        interval_ignored: configured.is_some() && interval.is_none() && !cache_only,
    }
}

fn build_orchestrator(
    config: &Config,
    mode: RunMode,
    cache: Option<Arc<SqliteRecordCache>>,
) -> Result<SyncOrchestrator> {
    let plex = Arc::new(PlexClient::new(&config.plex).context("Failed to create Plex client")?);
    info!("Using Plex server at {}", config.plex.url);

    let orchestrator = SyncOrchestrator::new(
        plex,
        config.plex.libraries.clone(),
        config.filter.clone(),
        Synchronizer::new(config.sync.separator()),
    );

    if mode == RunMode::Clear {
        return Ok(orchestrator);
    }

    let dtdd = Arc::new(
        DtddClient::new(&config.dtdd).context("Failed to create DoesTheDogDie client")?,
    );
    let pacer = Pacer::from_secs_f64(config.dtdd.api_delay_secs);
    info!(
        "DoesTheDogDie requests spaced {:?} apart",
        pacer.min_interval()
    );
    let cache = cache.context("Sync mode needs the lookup cache")?;
    let lookup = LookupClient::new(dtdd, cache, pacer);

    Ok(orchestrator.with_matcher(Matcher::new(Arc::new(lookup))))
}

/// Run until Ctrl-C, sleeping `every` between runs. Failed runs are logged
/// and retried on the next tick.
async fn run_periodically(orchestrator: &SyncOrchestrator, options: &RunOptions, every: Duration) {
    info!("Running every {:?}; press Ctrl-C to stop", every);
    loop {
        if let Err(e) = orchestrator.run(options).await {
            error!("Run failed: {}", e);
        }

        tokio::select! {
            _ = tokio::time::sleep(every) => {}
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }
}
