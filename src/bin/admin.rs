//! CLI administration tool for dining-service.
//!
//! Provides commands for registering tables, inspecting orders,
//! and performing database operations without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Register table 7
//! cargo run --bin admin -- table create 7
//!
//! # List tables with occupancy
//! cargo run --bin admin -- table list
//!
//! # Order counts and currently open orders
//! cargo run --bin admin -- orders
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`, or `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`

use dining_service::application::services::TableService;
use dining_service::config::Config;
use dining_service::domain::SystemClock;
use dining_service::domain::repositories::{OrderFilter, TableOrderRepository};
use dining_service::infrastructure::persistence::{PgTableOrderRepository, PgTableRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing dining-service.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage tables
    Table {
        #[command(subcommand)]
        action: TableAction,
    },

    /// Show order counts and open orders
    Orders,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum TableAction {
    /// Register a new table
    Create {
        /// Table number (prompted if omitted)
        number: Option<i64>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tables
    List,
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

type PgTableService = TableService<PgTableRepository, PgTableOrderRepository>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url().context("Database is not configured")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    let pool = Arc::new(pool);

    let tables = Arc::new(PgTableRepository::new(pool.clone()));
    let orders = Arc::new(PgTableOrderRepository::new(pool.clone()));

    match cli.command {
        Commands::Table { action } => {
            let service = TableService::new(tables, orders, Arc::new(SystemClock));
            handle_table_action(action, &service).await?
        }
        Commands::Orders => handle_orders(orders.as_ref()).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_table_action(action: TableAction, service: &PgTableService) -> Result<()> {
    match action {
        TableAction::Create { number, yes } => create_table(service, number, yes).await,
        TableAction::List => list_tables(service).await,
    }
}

/// Registers a table after an optional confirmation.
async fn create_table(service: &PgTableService, number: Option<i64>, yes: bool) -> Result<()> {
    println!("{}", "🍽️  Register Table".bright_blue().bold());
    println!();

    let number = match number {
        Some(n) => n,
        None => Input::new().with_prompt("Table number").interact_text()?,
    };

    println!("  Number: {}", number.to_string().cyan());
    println!();

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Create this table?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let table = service
        .create_table(number)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create table: {}", e))?;

    println!();
    println!(
        "{} {}",
        "✅ Table created:".green().bold(),
        table.number.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Lists tables with their occupancy.
///
/// # Output Format
///
/// ```text
/// 📋 Tables
///
///   Number  Created              Status
///   ────────────────────────────────────────────────────────────
///   1       2024-05-17 18:30     TAKEN (6f1c0a4e-...)
///   2       2024-05-17 18:30     FREE
/// ```
async fn list_tables(service: &PgTableService) -> Result<()> {
    println!("{}", "📋 Tables".bright_blue().bold());
    println!();

    let tables = service
        .list_tables()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tables: {}", e))?;

    if tables.is_empty() {
        println!("{}", "  No tables found".yellow());
        println!();
        println!(
            "  Create one with: {} admin table create <number>",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<7} {:<20} {:<10}",
        "Number".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(60).bright_black());

    for status in &tables {
        let state = match status.open_order_id {
            Some(order_id) => format!("TAKEN ({})", order_id).red(),
            None => "FREE".green(),
        };

        println!(
            "  {:<7} {:<20} {}",
            status.table.number.to_string().cyan(),
            status
                .table
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            state
        );
    }

    println!();
    println!(
        "  Total: {}",
        tables.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Displays order counts and the currently open orders.
async fn handle_orders(orders: &PgTableOrderRepository) -> Result<()> {
    println!("{}", "📊 Orders".bright_blue().bold());
    println!();

    let open_count = orders
        .count(Some(false))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count orders: {}", e))?;
    let billed_count = orders
        .count(Some(true))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count orders: {}", e))?;

    println!("  Open:   {}", open_count.to_string().bright_green().bold());
    println!(
        "  Billed: {}",
        billed_count.to_string().bright_green().bold()
    );
    println!();

    if open_count == 0 {
        return Ok(());
    }

    let open = orders
        .list(OrderFilter::new(0, open_count).with_billed(Some(false)))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list orders: {}", e))?;

    println!(
        "  {:<6} {:<38} {:<10} {:<8} {}",
        "Table".bright_white().bold(),
        "Order".bright_white().bold(),
        "Opened".bright_white().bold(),
        "Guests".bright_white().bold(),
        "Items (pending)".bright_white().bold()
    );
    println!("  {}", "─".repeat(80).bright_black());

    for order in &open {
        let items: u64 = order.lines().iter().map(|l| u64::from(l.how_many())).sum();
        let pending: u64 = order
            .lines()
            .iter()
            .filter(|l| !l.is_sent_for_preparation())
            .map(|l| u64::from(l.how_many()))
            .sum();

        println!(
            "  {:<6} {:<38} {:<10} {:<8} {} ({})",
            order.table_number().to_string().cyan(),
            order.id().to_string().bright_black(),
            order.opened().format("%H:%M").to_string(),
            order.customers_count(),
            items,
            pending.to_string().yellow()
        );
    }
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
