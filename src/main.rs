use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use announcer::announce::{Placeholders, render_line};
use announcer::config::PluginConfig;
use announcer::github::{GitHub, GitHubRepo};
use announcer::host::{ConsoleServer, PermissionManager, PluginDescriptor, TickScheduler};
use announcer::plugin::{AnnouncerPlugin, Host};
use announcer::text::{ComponentFlattener, MiniMessage, center, measure_plain};
use announcer::update::{UpdateChecker, UpdateStatus, current_version};
use clap::Parser;
use log::{info, warn};

/// announcer - timed, permission-gated chat announcements
///
/// Renders MiniMessage announcements, checks the release feed for updates and
/// runs the announcement loop against a console host.
///
/// Examples:
///   announcer preview "<center><gold>Hello {player}"
///   announcer check --repo owner/repo
///   announcer run --player Steve --op Alex --seconds 120
#[derive(Parser, Debug)]
#[command(author, version = env!("ANNOUNCER_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to <config dir>/announcer/config.toml)
    #[arg(
        long = "config",
        short = 'c',
        env = "ANNOUNCER_CONFIG",
        value_name = "PATH",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check the release feed for a newer version
    Check(CheckArgs),

    /// Render markup and show its plain text, length, centered form and JSON
    Preview(PreviewArgs),

    /// Run the announcement loop with console players
    Run(RunArgs),

    /// Print the default configuration
    DefaultConfig,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Release feed in the format "owner/repo" (defaults to the configured one)
    #[arg(long, value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    /// Version to compare, without the "v" prefix (defaults to this build)
    #[arg(long = "running-version", value_name = "VERSION")]
    pub running_version: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PreviewArgs {
    /// MiniMessage markup; a leading <center> centers the line
    pub markup: String,

    /// Name substituted for {player}
    #[arg(long, default_value = "Player")]
    pub player: String,

    /// Reject unknown or malformed tags instead of keeping them as text
    #[arg(long)]
    pub strict: bool,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Player to join (repeatable)
    #[arg(long = "player", value_name = "NAME")]
    pub players: Vec<String>,

    /// Operator to join (repeatable)
    #[arg(long = "op", value_name = "NAME")]
    pub ops: Vec<String>,

    /// How long to run before everyone quits
    #[arg(long, default_value_t = 60)]
    pub seconds: u64,

    /// Skip the update check regardless of configuration
    #[arg(long)]
    pub no_update_check: bool,
}

fn load_config(path: Option<PathBuf>) -> Result<PluginConfig> {
    match path.or_else(PluginConfig::default_path) {
        Some(path) => PluginConfig::load(&path),
        None => {
            warn!("No configuration directory, using defaults");
            Ok(PluginConfig::default())
        }
    }
}

async fn check(args: CheckArgs, config: PluginConfig, api_url: Option<String>) -> Result<()> {
    let mut descriptor = PluginDescriptor::current();
    if let Some(version) = args.running_version {
        descriptor.version = version;
    }

    let repo: GitHubRepo = args
        .repo
        .unwrap_or(config.update_checker_repo)
        .parse()?;
    let github = GitHub::with_user_agent(&descriptor.user_agent(), api_url)?;

    let checker = UpdateChecker::new(Arc::new(github), repo, descriptor.clone());
    let status = checker
        .check()
        .await
        .map_err(|e| anyhow!("Cannot look for updates: {:#}", e))?;

    if status == UpdateStatus::UpToDate {
        println!(
            "{} is up to date ({})",
            descriptor.name,
            current_version(&descriptor.version)
        );
    }
    for line in status.report(&descriptor.name) {
        println!("{}", line);
    }
    Ok(())
}

fn preview(args: PreviewArgs) -> Result<()> {
    if args.strict {
        let markup = args.markup.strip_prefix("<center>").unwrap_or(&args.markup);
        MiniMessage::strict()
            .parse(markup)
            .context("Invalid markup")?;
    }

    let component = render_line(&args.markup, &Placeholders::new(Some(&args.player), 1));
    let flattener = ComponentFlattener::basic();

    println!("plain: {}", flattener.plain_text(&component));
    println!("length: {}", measure_plain(&component, &flattener));
    println!(
        "centered: {}",
        flattener.plain_text(&center(component.clone()))
    );
    println!("json: {}", component.to_json());
    Ok(())
}

async fn run(args: RunArgs, mut config: PluginConfig, api_url: Option<String>) -> Result<()> {
    if args.no_update_check {
        config.update_checker = false;
    }

    let descriptor = PluginDescriptor::current();
    let permissions = Arc::new(PermissionManager::new());
    let server = Arc::new(ConsoleServer::stdout(permissions.clone()));
    let github = GitHub::with_user_agent(&descriptor.user_agent(), api_url)?;

    let plugin = AnnouncerPlugin::new(
        descriptor,
        config,
        Host {
            server: server.clone(),
            scheduler: Arc::new(TickScheduler::start()),
            permissions,
            github: Arc::new(github),
        },
    );
    plugin.enable()?;

    let joining = args
        .players
        .iter()
        .map(|name| (name, false))
        .chain(args.ops.iter().map(|name| (name, true)));
    for (name, op) in joining {
        let player = server.join(name, op, &[]);
        plugin.on_join(player.as_ref());
    }

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(args.seconds)) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    for name in args.players.iter().chain(args.ops.iter()) {
        if let Some(player) = server.quit(name) {
            plugin.on_quit(player.as_ref());
        }
    }
    plugin.disable();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => check(args, load_config(cli.config)?, cli.api_url).await?,
        Commands::Preview(args) => preview(args)?,
        Commands::Run(args) => run(args, load_config(cli.config)?, cli.api_url).await?,
        Commands::DefaultConfig => print!("{}", PluginConfig::default().to_toml()?),
    }
    Ok(())
}
