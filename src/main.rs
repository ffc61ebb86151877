use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::anyhow;
use chrono::Local;
use clap::Parser;
use log::{debug, error, info, warn};

use github_manifest_harvester::{
    ContentFetcherRateLimitEnforcer, DEFAULT_PER_PAGE, DEFAULT_RESET_BUFFER,
    DEFAULT_SAFETY_THRESHOLD, DEFAULT_WORKERS, FilesystemPersister, GITHUB_API_ENDPOINT,
    GITHUB_AUTH_TOKEN_ENV, GitHubClient, GitHubContentFetcher, GitHubPageFetcher, HarvestError,
    Harvester, LogProgressObserver, MIN_SAFETY_THRESHOLD, ManifestCatalog,
    PageFetcherRateLimitEnforcer, PaginatedLister, ParallelScheduler, RateLimiter, StdResult,
    TextReportWriter, resolve_token,
};

/// Command line arguments for the manifest harvester
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Organization whose repositories are harvested
    #[arg(short, long, env = "GITHUB_ORGANIZATION")]
    organization: String,

    /// Number of concurrent download workers
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_WORKERS,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    workers: usize,

    /// Directory in which the timestamped run directory is created
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Root URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API_ENDPOINT)]
    api_url: String,

    /// Manifest files fetched from every repository (defaults to the built-in catalog)
    #[arg(short, long, value_delimiter = ',')]
    files: Vec<String>,

    /// Number of repositories requested per listing page
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    per_page: u16,

    /// Remaining quota below which requests wait for the rate limit reset
    #[arg(
        long,
        default_value_t = DEFAULT_SAFETY_THRESHOLD,
        value_parser = clap::value_parser!(u32).range(i64::from(MIN_SAFETY_THRESHOLD)..)
    )]
    safety_threshold: u32,

    /// Seconds waited after the rate limit reset time
    #[arg(
        long,
        default_value_t = DEFAULT_RESET_BUFFER.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    reset_buffer_secs: u64,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    http_timeout_secs: u64,

    /// Skip querying the rate limit endpoint before starting
    #[arg(long)]
    skip_rate_limit_probe: bool,
}

#[tokio::main]
async fn main() -> StdResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = harvest(args).await {
        error!("Harvest aborted: {e:#}");
        return Err(e);
    }

    Ok(())
}

async fn harvest(args: Args) -> StdResult<()> {
    let token = resolve_token(std::env::var(GITHUB_AUTH_TOKEN_ENV).ok())?;
    let organization = args.organization.trim();
    if organization.is_empty() {
        return Err(anyhow!(HarvestError::Config(
            "Organization name must not be empty".to_string()
        )));
    }
    let catalog = prepare_catalog(&args.files)?;
    debug!("Manifest catalog: {catalog:?}");
    info!("Starting manifest harvest of organization {organization}");

    let base_dir = args.output_dir.join(format!(
        "dependencies_{}",
        Local::now().format("%Y-%m-%d_%H-%M-%S")
    ));
    let client = Arc::new(GitHubClient::try_new(
        &args.api_url,
        &token,
        Duration::from_secs(args.http_timeout_secs),
    )?);
    let rate_limiter = Arc::new(RateLimiter::new(
        args.safety_threshold,
        Duration::from_secs(args.reset_buffer_secs),
    ));
    if !args.skip_rate_limit_probe {
        match client.fetch_rate_limit().await {
            Ok(rate_limit) => {
                info!("{rate_limit}");
                rate_limiter.update(&rate_limit).await;
            }
            Err(e) => warn!("Rate limit probe failed, relying on response headers: {e:#}"),
        }
    }

    let harvester = build_harvester(&args, client, rate_limiter, &base_dir).await?;
    let report = harvester.run(organization, &catalog).await?;
    info!(
        "Harvest of {organization} written to {} ({} tasks)",
        base_dir.display(),
        report.total()
    );

    Ok(())
}

fn prepare_catalog(files: &[String]) -> StdResult<ManifestCatalog> {
    if files.is_empty() {
        return Ok(ManifestCatalog::default());
    }
    let catalog = ManifestCatalog::new(files);
    if catalog.is_empty() {
        return Err(anyhow!(HarvestError::Config(
            "Manifest file list must not be empty".to_string()
        )));
    }

    Ok(catalog)
}

async fn build_harvester(
    args: &Args,
    client: Arc<GitHubClient>,
    rate_limiter: Arc<RateLimiter>,
    base_dir: &std::path::Path,
) -> StdResult<Harvester> {
    let lister = Arc::new(PaginatedLister::new(
        Arc::new(PageFetcherRateLimitEnforcer::new(
            Arc::new(GitHubPageFetcher::new(client.clone())),
            rate_limiter.clone(),
        )),
        args.per_page,
    ));
    let fetcher = Arc::new(ContentFetcherRateLimitEnforcer::new(
        Arc::new(GitHubContentFetcher::new(client)),
        rate_limiter,
    ));
    let persister = Arc::new(FilesystemPersister::try_new(base_dir).await?);
    let scheduler = Arc::new(ParallelScheduler::new(
        fetcher,
        persister,
        Arc::new(LogProgressObserver::new()),
        args.workers,
    ));

    Ok(Harvester::new(
        lister,
        scheduler,
        Arc::new(TextReportWriter::new(base_dir)),
    ))
}
