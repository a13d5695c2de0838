use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ladder_bot::api::{build_router, state::AppState};
use ladder_bot::cache::{LookupError, RefreshOutcome, ResourceCache, StatsAnswer, StatsQuery};
use ladder_bot::config::AppConfig;
use ladder_bot::fetch::{Fetch, FetcherConfig, HttpFetcher, LadderApi};
use ladder_bot::models::Region;
use ladder_bot::reactions::ReactionClient;
use ladder_bot::storage::{CacheStore, StorageConfig};

#[derive(Parser)]
#[command(name = "ladder-bot")]
#[command(about = "Regional ranking lookups with a locally cached copy of the ladder")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Region to query (overrides the saved region)
    #[arg(long)]
    region: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match statistics for a player, or "<p1> vs <p2>" for a head-to-head
    Stats {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Ranking card for a player, or the rankings link without one
    Rank {
        #[arg(num_args = 0..)]
        player: Vec<String>,
    },

    /// Print the cached rankings
    Rankings {
        /// Number of entries to show
        #[arg(long, default_value = "25")]
        limit: usize,
    },

    /// Switch region and rebuild the cache
    Region { name: String },

    /// Rebuild the cache regardless of the tournament count
    Refresh,

    /// Fetch a reaction image URL ("random" picks a type)
    Reaction {
        kind: String,

        #[arg(long)]
        nsfw: bool,
    },

    /// List known reaction image types
    ReactionTypes {
        #[arg(long)]
        nsfw: bool,
    },

    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },
}

fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        return AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }
    Ok(AppConfig::default())
}

fn build_fetcher(timeout_seconds: u64, user_agent: &str) -> Result<Arc<dyn Fetch>> {
    let fetcher = HttpFetcher::new(FetcherConfig {
        timeout: Duration::from_secs(timeout_seconds),
        user_agent: user_agent.to_string(),
    })?;
    Ok(Arc::new(fetcher))
}

/// API client, store and starting region for the cache.
fn cache_parts(cli: &Cli, config: &AppConfig) -> Result<(LadderApi, CacheStore, Region)> {
    let storage = StorageConfig::new(config.data_dir.clone());
    let store = CacheStore::new(&storage);

    let region = match &cli.region {
        Some(region) => Region::new(region.as_str()),
        None => store
            .load_settings()
            .region
            .unwrap_or_else(|| Region::new(config.ladder.region.as_str())),
    };

    let fetcher = build_fetcher(config.ladder.timeout_seconds, &config.ladder.user_agent)?;
    let api = LadderApi::new(fetcher, config.ladder.base_url.as_str());
    Ok((api, store, region))
}

async fn open_cache(cli: &Cli, config: &AppConfig) -> Result<ResourceCache> {
    let (api, store, region) = cache_parts(cli, config)?;
    let cache = ResourceCache::initialize(api, store, region)
        .await?
        .with_site_url(config.ladder.site_url.as_str());
    Ok(cache)
}

async fn open_reactions(config: &AppConfig) -> Result<Option<ReactionClient>> {
    let Some(api_key) = config.reactions.api_key() else {
        tracing::warn!(
            "{} is not set, reaction images are disabled",
            config.reactions.api_key_env
        );
        return Ok(None);
    };

    let fetcher = build_fetcher(config.reactions.timeout_seconds, &config.reactions.user_agent)?;
    let mut client = ReactionClient::new(fetcher, config.reactions.base_url.as_str(), &api_key);
    client.load().await;
    Ok(Some(client))
}

fn print_outcome(outcome: &RefreshOutcome) {
    match outcome {
        RefreshOutcome::UpToDate { tournament_count } => {
            println!("Up to date ({} tournaments on record)", tournament_count);
        }
        RefreshOutcome::Refreshed {
            tournament_count,
            players,
            rankings,
        } => {
            println!(
                "Refreshed: {} players, {} ranked, {} tournaments on record",
                players, rankings, tournament_count
            );
        }
    }
}

fn report_lookup_error(err: LookupError) {
    match err {
        LookupError::PlayerNotFound(name) => println!("No such player: {}", name),
        LookupError::NoMatchupData { player, opponent } => {
            println!("No data for {}/{}.", player, opponent)
        }
        LookupError::Cache(e) => {
            tracing::error!("Lookup failed: {}", e);
            println!("Couldn't reach the ranking service, try again later.");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(Path::new(&cli.config))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(data_dir);
    }
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting ladder-bot v{}", env!("CARGO_PKG_VERSION"));
    if !Path::new(&cli.config).exists() {
        tracing::warn!("No config file at {}, using defaults", cli.config);
    }

    match &cli.command {
        Commands::Stats { query } => {
            let text = query.join(" ");
            let Some(query) = StatsQuery::parse(&text) else {
                bail!("Give a player name or \"<p1> vs <p2>\"");
            };

            let cache = open_cache(&cli, &config).await?;
            match cache.answer(&query).await {
                Ok(StatsAnswer::Player(summary)) => {
                    match &summary.since {
                        Some(since) => println!(
                            "I can see {} has {} match records, since {}",
                            summary.player, summary.matches_recorded, since
                        ),
                        None => println!("I can see {} has no match records", summary.player),
                    }
                    println!(
                        "This player has {} wins and {} losses ({})",
                        summary.wins, summary.losses, summary.ratio
                    );
                }
                Ok(StatsAnswer::Matchup(matchup)) => {
                    println!(
                        "{} is ({}-{}) vs {}, since {}.",
                        matchup.player,
                        matchup.record.wins,
                        matchup.record.losses,
                        matchup.opponent,
                        matchup.record.since
                    );
                    println!(
                        "They last played at {} ({}).",
                        matchup.record.last_tournament, matchup.record.last_played
                    );
                }
                Err(e) => report_lookup_error(e),
            }
        }
        Commands::Rank { player } => {
            let cache = open_cache(&cli, &config).await?;
            if player.is_empty() {
                println!("{}", cache.rankings_url().await);
                return Ok(());
            }

            match cache.player_ranking(&player.join(" ")).await {
                Ok(card) => {
                    println!("{}  {}", card.name, card.url);
                    match card.adjusted_rating {
                        Some(rating) => println!("Adjusted rating: {}", rating),
                        None => println!("Adjusted rating: unrated in this region"),
                    }
                    if let Some(rank) = card.rank {
                        match card.tier {
                            Some(tier) => println!("Rank: {} ({})", rank, tier),
                            None => println!("Rank: {}", rank),
                        }
                    }
                }
                Err(e) => report_lookup_error(e),
            }
        }
        Commands::Rankings { limit } => {
            let cache = open_cache(&cli, &config).await?;
            let rankings = cache.get_rankings().await;
            if rankings.is_empty() {
                println!("No rankings cached for {}", cache.region().await);
            }
            for entry in rankings.iter().take(*limit) {
                println!("{:>4}  {}", entry.rank, entry.name);
            }
        }
        Commands::Region { name } => {
            // The switch rebuilds everything, so skip the startup sync.
            let (api, store, region) = cache_parts(&cli, &config)?;
            let cache = ResourceCache::open(api, store, region)?;
            println!("Set new region: {}, refreshing data now...", name);
            let outcome = cache.set_region(Region::new(name.as_str())).await?;
            print_outcome(&outcome);
        }
        Commands::Refresh => {
            let cache = open_cache(&cli, &config).await?;
            let outcome = cache.refresh().await?;
            print_outcome(&outcome);
        }
        Commands::Reaction { kind, nsfw } => {
            let Some(client) = open_reactions(&config).await? else {
                bail!("Set {} to use reaction images", config.reactions.api_key_env);
            };

            let image = if kind == "random" {
                client.random_any(*nsfw).await?
            } else {
                client.random(kind, *nsfw).await?
            };
            match image {
                Some(image) if image.random => {
                    println!("Randomly chose: {}\n{}", image.kind, image.url)
                }
                Some(image) => println!("{}", image.url),
                None => println!("Unknown reaction type: {}", kind),
            }
        }
        Commands::ReactionTypes { nsfw } => {
            let Some(client) = open_reactions(&config).await? else {
                bail!("Set {} to use reaction images", config.reactions.api_key_env);
            };
            let catalog = client.catalog();
            let types = if *nsfw {
                &catalog.nsfw_types
            } else {
                &catalog.types
            };
            println!("{}", types.join(", "));
        }
        Commands::Serve { host, port } => {
            let cache = open_cache(&cli, &config).await?;
            let reactions = open_reactions(&config).await?.map(Arc::new);
            let state = AppState {
                cache: Arc::new(cache),
                reactions,
            };

            let app = build_router(state);
            let addr = format!(
                "{}:{}",
                host.as_deref().unwrap_or(&config.server.host),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
