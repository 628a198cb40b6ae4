//! CLI administration tool for shrtn.
//!
//! Provides commands for setting up admin credentials, managing short links,
//! and checking the database without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Generate a token signing secret
//! cargo run --bin shrtn-admin -- gen-secret
//!
//! # Hash the admin password for ADMIN_PASSWORD_HASH
//! cargo run --bin shrtn-admin -- hash-password
//!
//! # List and delete short links
//! cargo run --bin shrtn-admin -- urls list
//! cargo run --bin shrtn-admin -- urls delete aB3_x9
//!
//! # View statistics
//! cargo run --bin shrtn-admin -- stats
//!
//! # Check database connection
//! cargo run --bin shrtn-admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `TOKEN_SIGNING_SECRET`: required by `hash-password`
//! - `DATABASE_URL` (or `DB_*` components): required by `urls`, `stats` and `db`
//! - `REDIS_URL` (optional): evicted on `urls delete` so shared caches forget the link

use shrtn::application::services::hash_password;
use shrtn::config::Config;
use shrtn::domain::repositories::MappingRepository;
use shrtn::infrastructure::cache::{CacheService, RedisCache};
use shrtn::infrastructure::persistence::PgMappingRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// Bytes of entropy in a generated signing secret.
const SECRET_BYTES: usize = 32;

/// CLI tool for managing shrtn.
#[derive(Parser)]
#[command(name = "shrtn-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Hash an admin password for ADMIN_PASSWORD_HASH
    HashPassword {
        /// Password to hash (prompted for if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Generate a random TOKEN_SIGNING_SECRET
    GenSecret,

    /// Manage short links
    Urls {
        #[command(subcommand)]
        action: UrlsAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Short link subcommands.
#[derive(Subcommand)]
enum UrlsAction {
    /// List all short links, newest first
    List,

    /// Delete a short link
    Delete {
        /// Short code to delete
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::HashPassword { password } => handle_hash_password(password)?,
        Commands::GenSecret => handle_gen_secret()?,
        Commands::Urls { action } => handle_urls_action(action, &connect().await?).await?,
        Commands::Stats => handle_stats(&connect().await?).await?,
        Commands::Db { action } => handle_db_action(action, &connect().await?).await?,
    }

    Ok(())
}

async fn connect() -> Result<PgPool> {
    let database_url = Config::load_database_url()?;

    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

/// Prints the hex HMAC of the admin password under the signing secret.
///
/// The hash is only valid for the secret it was made with; rotating
/// `TOKEN_SIGNING_SECRET` means re-hashing the password.
fn handle_hash_password(password: Option<String>) -> Result<()> {
    let secret = std::env::var("TOKEN_SIGNING_SECRET")
        .context("TOKEN_SIGNING_SECRET must be set to hash a password")?;

    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Admin password")
            .with_confirmation("Repeat password", "Passwords do not match")
            .interact()?,
    };

    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    eprintln!("{}", "🔑 Add this to your environment:".bright_blue().bold());
    eprintln!();
    println!("{}", hash_password(&secret, &password));
    eprintln!();
    eprintln!(
        "  {}",
        "ADMIN_PASSWORD_HASH=<the value above>".bright_black()
    );

    Ok(())
}

/// Prints a hex-encoded random secret.
fn handle_gen_secret() -> Result<()> {
    let mut bytes = [0u8; SECRET_BYTES];
    getrandom::fill(&mut bytes).map_err(|e| anyhow::anyhow!("Failed to read OS randomness: {}", e))?;

    println!("{}", hex::encode(bytes));

    Ok(())
}

/// Dispatches short link commands.
async fn handle_urls_action(action: UrlsAction, pool: &PgPool) -> Result<()> {
    let repo = PgMappingRepository::new(Arc::new(pool.clone()));

    match action {
        UrlsAction::List => list_urls(&repo).await?,
        UrlsAction::Delete { code, yes } => delete_url(&repo, &code, yes).await?,
    }

    Ok(())
}

/// Lists all short links.
///
/// # Output Format
///
/// ```text
/// 📋 Short Links
///
///   Code       Visits   Created            Destination
///   ──────────────────────────────────────────────────────────────────
///   aB3_x9     12       2025-01-15 10:30   https://example.com/very/long/path
/// ```
async fn list_urls(repo: &PgMappingRepository) -> Result<()> {
    println!("{}", "📋 Short Links".bright_blue().bold());
    println!();

    let mappings = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list short links: {}", e))?;

    if mappings.is_empty() {
        println!("{}", "  No short links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<10} {:<8} {:<18} {}",
        "Code".bright_white().bold(),
        "Visits".bright_white().bold(),
        "Created".bright_white().bold(),
        "Destination".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for mapping in &mappings {
        println!(
            "  {:<10} {:<8} {:<18} {}",
            mapping.short_code.cyan(),
            mapping.visits.to_string().bright_green(),
            mapping
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            mapping.original_url
        );
    }

    println!();
    println!(
        "  Total: {}",
        mappings.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Deletes a short link after confirmation.
///
/// When Redis is configured the cached destination is evicted too. In-process
/// caches of running servers keep the old destination until their TTL runs
/// out; delete through the HTTP API for immediate effect.
async fn delete_url(repo: &PgMappingRepository, code: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Short Link".bright_blue().bold());
    println!();

    let mapping = repo
        .find_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Short link not found")?;

    println!("  Code:        {}", mapping.short_code.cyan());
    println!("  Destination: {}", mapping.original_url);
    println!("  Visits:      {}", mapping.visits.to_string().bright_black());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this short link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    repo.delete(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete short link: {}", e))?;

    if let Some(redis_url) = Config::load_redis_url() {
        match RedisCache::connect(&redis_url, 0).await {
            Ok(cache) => {
                if let Err(e) = cache.invalidate(code).await {
                    println!("{} {}", "⚠️  Failed to evict Redis entry:".yellow(), e);
                }
            }
            Err(e) => println!("{} {}", "⚠️  Redis unavailable:".yellow(), e),
        }
    }

    println!();
    println!("{}", "✅ Short link deleted".green().bold());
    println!(
        "{}",
        "   Servers using the memory cache may redirect until the cache TTL expires."
            .bright_black()
    );
    println!();

    Ok(())
}

/// Displays link and visit totals.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (links_count, visits_total): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(visits), 0)::BIGINT FROM url_mappings",
    )
    .fetch_one(pool)
    .await?;

    let unvisited: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM url_mappings WHERE visits = 0")
            .fetch_one(pool)
            .await?;

    println!(
        "  Links:     {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Visits:    {}",
        visits_total.to_string().bright_green().bold()
    );
    println!(
        "  Unvisited: {}",
        unvisited.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
