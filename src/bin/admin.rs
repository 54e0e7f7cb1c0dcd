//! CLI administration tool for the shortener store.
//!
//! Runs the store layer against whatever backend the environment selects and
//! exposes its operations without an HTTP front end.
//!
//! # Usage
//!
//! ```bash
//! # Show the active backend and check it is reachable
//! cargo run --bin admin -- check
//!
//! # Shorten a URL
//! cargo run --bin admin -- shorten https://example.com --user alice
//!
//! # Resolve a token
//! cargo run --bin admin -- get AbCd1234
//!
//! # List a user's URLs (postgres only)
//! cargo run --bin admin -- list --user alice
//!
//! # Delete tokens owned by a user (postgres only)
//! cargo run --bin admin -- delete --user alice AbCd1234 EfGh5678
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_DSN` / `DATABASE_URL`: PostgreSQL connection string
//! - `FILE_STORAGE_PATH`: append log used when no database is configured
//! - `LOG_LEVEL`, `LOG_FORMAT`: logging

use shortener_store::bootstrap::{self, StoreRuntime};
use shortener_store::config;
use shortener_store::error::StoreError;
use shortener_store::telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;

/// CLI tool for managing the shortener store.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active backend and check its connection
    Check,

    /// Shorten a URL
    Shorten {
        /// URL to shorten
        url: String,

        /// Owner of the new token
        #[arg(short, long, default_value = "admin")]
        user: String,
    },

    /// Resolve a token to its original URL
    Get {
        /// Short token
        token: String,
    },

    /// List URLs owned by a user
    List {
        #[arg(short, long)]
        user: String,
    },

    /// Delete tokens owned by a user
    Delete {
        #[arg(short, long)]
        user: String,

        /// Tokens to delete
        #[arg(required = true)]
        tokens: Vec<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Failed to load configuration")?;
    telemetry::init_tracing(&config)?;
    config.print_summary();

    let runtime = bootstrap::start(&config)
        .await
        .context("Failed to start storage backend")?;

    let result = match cli.command {
        Commands::Check => check(&runtime).await,
        Commands::Shorten { url, user } => shorten(&runtime, &user, &url).await,
        Commands::Get { token } => get(&runtime, &token).await,
        Commands::List { user } => list(&runtime, &user).await,
        Commands::Delete { user, tokens, yes } => delete(&runtime, &user, &tokens, yes).await,
    };

    // Always drain the delete worker, even when the command failed.
    runtime.shutdown().await;

    result
}

async fn check(runtime: &StoreRuntime) -> Result<()> {
    let service = runtime.service();

    println!(
        "{} {}",
        "🔍 Backend:".bright_blue(),
        service.backend_name().bright_white().bold()
    );

    match service.ping().await {
        Ok(()) => println!("{}", "✅ Connection OK".green().bold()),
        Err(StoreError::Unsupported { .. }) => {
            println!("{}", "ℹ️  Backend has no external connection".yellow())
        }
        Err(e) => return Err(anyhow::anyhow!("Ping failed: {}", e)),
    }

    Ok(())
}

async fn shorten(runtime: &StoreRuntime, user: &str, url: &str) -> Result<()> {
    let shortened = runtime
        .service()
        .shorten(user, url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shorten URL: {}", e))?;

    if shortened.created {
        println!("{}", "✅ Short URL created".green().bold());
    } else {
        println!("{}", "⚠️  URL was already shortened".yellow());
    }
    println!("  Token: {}", shortened.short_url.bright_yellow().bold());
    println!("  URL:   {}", url.cyan());

    Ok(())
}

async fn get(runtime: &StoreRuntime, token: &str) -> Result<()> {
    match runtime.service().resolve(token).await {
        Ok(url) => println!("  {} → {}", token.bright_yellow(), url.cyan()),
        Err(StoreError::NotFound { .. }) => println!("{}", "❌ Token not found".red()),
        Err(StoreError::Deleted { .. }) => println!("{}", "🗑️  Token has been deleted".red()),
        Err(e) => return Err(anyhow::anyhow!("Failed to resolve token: {}", e)),
    }

    Ok(())
}

/// Lists a user's URLs.
///
/// # Output Format
///
/// ```text
/// 📋 URLs of alice
///
///   Token      Status    URL
///   ────────────────────────────────────────
///   AbCd1234   ACTIVE    https://example.com
/// ```
async fn list(runtime: &StoreRuntime, user: &str) -> Result<()> {
    println!("{} {}", "📋 URLs of".bright_blue().bold(), user.cyan());
    println!();

    let urls = runtime
        .service()
        .user_urls(user)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list URLs: {}", e))?;

    if urls.is_empty() {
        println!("{}", "  No URLs found".yellow());
        return Ok(());
    }

    println!(
        "  {:<10} {:<9} {}",
        "Token".bright_white().bold(),
        "Status".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(60).bright_black());

    for record in &urls {
        let status = if record.is_deleted() {
            "DELETED".red()
        } else {
            "ACTIVE".green()
        };

        println!(
            "  {:<10} {:<9} {}",
            record.short_url.bright_yellow(),
            status,
            record.original_url.cyan()
        );
    }

    println!();
    println!("  Total: {}", urls.len().to_string().bright_white().bold());

    Ok(())
}

/// Queues tokens for deletion after a confirmation prompt.
///
/// Only tokens owned by `user` are accepted; deletion is applied on the next
/// flush, which happens at the latest when the runtime shuts down.
async fn delete(
    runtime: &StoreRuntime,
    user: &str,
    tokens: &[String],
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🗑️  Delete URLs".bright_blue().bold());
    println!();
    println!("  User:   {}", user.cyan());
    println!("  Tokens: {}", tokens.join(", ").bright_yellow());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete these URLs?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let accepted = runtime
        .service()
        .request_deletion(user, tokens)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to request deletion: {}", e))?;

    println!(
        "{} {} of {}",
        "✅ Accepted for deletion:".green().bold(),
        accepted.to_string().bright_white().bold(),
        tokens.len()
    );

    Ok(())
}
