//! profile-feed - activity log and order history viewer.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid arguments, config, unreachable API, etc.)

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use profile_feed::cli::{Args, OutputFormat, View};
use profile_feed::client::{EventSource, ProfileApiClient};
use profile_feed::config::{Config, CONFIG_FILE_NAME};
use profile_feed::error::FeedError;
use profile_feed::feed::{ActivityFeed, INITIAL_PAGE_SIZE};
use profile_feed::orders::load_order_history;
use profile_feed::report::{
    generate_activity_markdown, generate_json_report, generate_orders_markdown, write_output,
    ActivityReport, OrderReport, RenderOptions,
};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // No logging needed to write the config template
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("profile-feed v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .profile-feed.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so a report written to stdout stays clean.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let client = ProfileApiClient::new(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_seconds),
    )
    .context("Failed to create profile API client")?;
    info!("Using profile API at {}", client.base_url());

    let rendered = match args.view {
        View::Activity => match run_activity(&args, &config, &client).await? {
            Some(rendered) => rendered,
            None => return Ok(()),
        },
        View::Orders => run_orders(&args, &client).await?,
    };

    write_output(&rendered, &config.report.output)?;
    if config.report.output != "-" && !args.quiet {
        eprintln!("✅ Report saved to: {}", config.report.output);
    }

    Ok(())
}

/// Load the activity feed and render it. Returns `None` when only the
/// category list was requested.
async fn run_activity(
    args: &Args,
    config: &Config,
    client: &ProfileApiClient,
) -> Result<Option<String>> {
    let profile_id = args.profile_id();
    let mut feed = ActivityFeed::new(client, profile_id);

    let max_pages = if args.all {
        None
    } else {
        Some(config.feed.max_pages.max(1))
    };

    let spinner = spinner(args.quiet);
    spinner.set_message(format!("Loading activity for {}...", profile_id));
    let loaded = load_activity(&mut feed, max_pages, &spinner).await;
    spinner.finish_and_clear();
    loaded.context("Unable to load activity")?;

    info!(
        "Loaded {} of {} events for {}",
        feed.records().len(),
        feed.total_records(),
        profile_id
    );

    if args.list_categories {
        for category in feed.available_categories() {
            println!("{}", category);
        }
        return Ok(None);
    }

    if let Some(ref filter) = args.filter {
        feed.select_category(filter).map_err(|e| {
            anyhow!(
                "{}. Available categories: {}",
                e,
                feed.available_categories().join(", ")
            )
        })?;
    }

    let report = ActivityReport::from_feed(&feed);
    let rendered = match args.format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Markdown => {
            generate_activity_markdown(&report, &RenderOptions::from(&config.report))
        }
    };

    Ok(Some(rendered))
}

/// Load the first page, then keep loading more until `max_pages` pages are
/// loaded (or everything, when `None`).
async fn load_activity<S: EventSource>(
    feed: &mut ActivityFeed<S>,
    max_pages: Option<usize>,
    spinner: &ProgressBar,
) -> Result<(), FeedError> {
    let subject_id = feed.subject_id().to_string();
    let mut summary = feed.load_page(&subject_id, INITIAL_PAGE_SIZE).await?;
    let mut pages = 1;

    while max_pages.map_or(true, |max| pages < max) {
        spinner.set_message(format!(
            "Loaded {} of {} events...",
            summary.loaded, summary.total_records
        ));
        match feed.load_more().await? {
            Some(next) => summary = next,
            None => break,
        }
        pages += 1;
    }

    Ok(())
}

async fn run_orders(args: &Args, client: &ProfileApiClient) -> Result<String> {
    let profile_id = args.profile_id();

    let spinner = spinner(args.quiet);
    spinner.set_message(format!("Loading order history for {}...", profile_id));
    let orders = load_order_history(client, profile_id).await;
    spinner.finish_and_clear();
    let orders = orders.context("Error loading order history")?;

    let report = OrderReport::new(profile_id, orders);
    match args.format {
        OutputFormat::Json => generate_json_report(&report),
        OutputFormat::Markdown => Ok(generate_orders_markdown(&report)),
    }
}

/// Spinner shown while a request is outstanding.
fn spinner(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
