//! Classifieds CLI - local front end for the classifieds marketplace.
//!
//! Commands:
//! - `classifieds init` - Write a starter classifieds.toml
//! - `classifieds categories` - Print the category catalog
//! - `classifieds post` - Post a listing through the five-step wizard
//! - `classifieds browse` - Browse active listings
//! - `classifieds show` - Show one listing
//! - `classifieds favorite` - Manage saved listings
//! - `classifieds message` - Send and read messages
//! - `classifieds profile` - Show and edit your profile

mod commands;
mod config;
mod context;
mod output;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::{
    BrowseArgs, CategoriesArgs, FavoriteArgs, InitArgs, MessageArgs, PostArgs, ProfileArgs,
    ShowArgs,
};

/// Classifieds CLI - Post, browse and save marketplace listings
#[derive(Parser)]
#[command(name = "classifieds")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Act as this user id
    #[arg(long = "as", global = true, value_name = "USER_ID")]
    as_user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter classifieds.toml
    Init(InitArgs),

    /// Print the category catalog
    Categories(CategoriesArgs),

    /// Post a listing
    Post(PostArgs),

    /// Browse active listings
    Browse(BrowseArgs),

    /// Show one listing
    Show(ShowArgs),

    /// Manage saved listings
    Favorite(FavoriteArgs),

    /// Send and read messages
    Message(MessageArgs),

    /// Show and edit your profile
    Profile(ProfileArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "classifieds=debug,classifieds_core=debug,classifieds_store=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, cli.as_user, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Init(args) => commands::init::run(args, &ctx).await,
        Commands::Categories(args) => commands::categories::run(args, &ctx).await,
        Commands::Post(args) => commands::post::run(args, &ctx).await,
        Commands::Browse(args) => commands::browse::run(args, &ctx).await,
        Commands::Show(args) => commands::show::run(args, &ctx).await,
        Commands::Favorite(args) => commands::favorite::run(args, &ctx).await,
        Commands::Message(args) => commands::message::run(args, &ctx).await,
        Commands::Profile(args) => commands::profile::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
