use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod aggregate;
mod dashboard;
mod db;
mod error;
mod models;
mod report;
mod watch;

#[derive(Parser)]
#[command(name = "report-desk")]
#[command(about = "Operator console for user-submitted reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Follow the live dashboard; prints a summary line per change
    Watch,
    /// One-shot snapshot of the counters and the community grouping
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Write a markdown operator summary
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export the community grouping to CSV
    Export {
        #[arg(long, default_value = "community.csv")]
        out: PathBuf,
    },
    /// Toggle a report between pending and resolved
    Resolve {
        report_id: String,
        #[arg(long)]
        response: Option<String>,
    },
    /// Resolve a report with a response and notify its submitter
    Respond {
        report_id: String,
        #[arg(long)]
        response: String,
    },
    /// Set the blocked flag on a user
    Block { user_id: String },
    /// File a report on behalf of a user (stands in for the submitting app)
    Submit {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "Community")]
        matter_type: String,
        #[arg(long)]
        description: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("report_desk=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Watch => {
            watch::run(pool).await?;
        }
        Commands::Stats { json } => {
            let reports = db::fetch_reports(&pool).await?;
            let stats = models::Stats {
                total_users: db::count_users(&pool).await?,
                total_reports: reports.len() as i64,
                resolved_reports: db::count_resolved_reports(&pool).await?,
            };
            let community = aggregate::community_aggregates(&reports);

            if json {
                let payload = serde_json::json!({
                    "stats": stats,
                    "community": community,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }

            println!("Total Users: {}", stats.total_users);
            println!("Total Reports: {}", stats.total_reports);
            println!("Resolved Cases: {}", stats.resolved_reports);

            if community.is_empty() {
                println!("No community reports found.");
            } else {
                println!("Community submitters:");
                for entry in community.iter() {
                    println!("- {}: {} message(s)", entry.name, entry.reports);
                }
            }
        }
        Commands::Report { out } => {
            let reports = db::fetch_reports(&pool).await?;
            let stats = models::Stats {
                total_users: db::count_users(&pool).await?,
                total_reports: reports.len() as i64,
                resolved_reports: db::count_resolved_reports(&pool).await?,
            };
            let community = aggregate::community_aggregates(&reports);
            let summary = report::build_report(&stats, &reports, &community);
            std::fs::write(&out, summary)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { out } => {
            let reports = db::fetch_reports(&pool).await?;
            let community = aggregate::community_aggregates(&reports);
            report::write_community_csv(&out, &community)?;
            println!("Exported {} submitter(s) to {}.", community.len(), out.display());
        }
        Commands::Resolve {
            report_id,
            response,
        } => {
            let current = db::fetch_report(&pool, &report_id)
                .await?
                .with_context(|| format!("no report with id {report_id}"))?;
            let status =
                db::toggle_resolve_status(&pool, &report_id, current.status, response.as_deref())
                    .await?;
            println!("Report {report_id} is now {status}.");
        }
        Commands::Respond {
            report_id,
            response,
        } => {
            let current = db::fetch_report(&pool, &report_id)
                .await?
                .with_context(|| format!("no report with id {report_id}"))?;

            // Two-step, non-atomic by design: a notification failure after a
            // successful status update leaves the report responded but the
            // user unnotified.
            let status =
                db::toggle_resolve_status(&pool, &report_id, current.status, Some(&response))
                    .await?;
            println!("Report {report_id} is now {status}.");

            db::send_notification(&pool, &current.user_id, &report_id, &response).await?;
            println!("Submitter notified.");
        }
        Commands::Block { user_id } => {
            db::block_user(&pool, &user_id).await?;
            println!("User {user_id} blocked.");
        }
        Commands::Submit {
            user_id,
            name,
            email,
            phone,
            matter_type,
            description,
        } => {
            let id = db::insert_report(
                &pool,
                &user_id,
                &name,
                &email,
                &phone,
                &matter_type,
                &description,
            )
            .await?;
            println!("Report {id} filed.");
        }
    }

    Ok(())
}
