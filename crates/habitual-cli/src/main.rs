mod config;
mod goal_cmds;
mod habit_cmds;
mod plan_cmds;
mod serve_cmd;
#[cfg(test)]
mod test_util;
mod today_cmd;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use habitual_core::Tracker;
use habitual_db::pool;

use config::HabitualConfig;

#[derive(Parser)]
#[command(name = "habitual", about = "Weekly habit planner and daily checklist")]
struct Cli {
    /// Database URL (overrides HABITUAL_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a habitual config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/habitual")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create the database if needed and apply migrations
    DbInit,
    /// Run the HTTP JSON API
    Serve {
        /// Address to bind (overrides config and HABITUAL_BIND)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides config and HABITUAL_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Keep all state in memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },
    /// Habit management
    Habit {
        #[command(subcommand)]
        command: HabitCommands,
    },
    /// Weekly plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Mark a habit done for a day, or undo it
    Done {
        /// Habit ID
        habit_id: String,
        /// Day (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show what is scheduled for a day and what is already done
    Today {
        /// Day (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// One-off goal management
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Print shell completions to stdout
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum HabitCommands {
    /// Register a new habit
    Add {
        /// Habit name
        name: String,
        /// Category label
        #[arg(long, default_value = "")]
        category: String,
    },
    /// List all habits
    List,
    /// Delete a habit together with its plan entries and completions
    Remove {
        /// Habit ID
        habit_id: String,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Show the weekly plan
    Show,
    /// Add a habit to a weekday, or remove it if already there
    Toggle {
        /// Weekday code (mon, tue, wed, thu, fri, sat, sun)
        weekday: String,
        /// Habit ID
        habit_id: String,
    },
    /// Copy one weekday onto every other day, replacing what was there
    Replicate {
        /// Source weekday (defaults to the configured replicate_source)
        #[arg(long)]
        from: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Add a goal
    Add {
        /// Goal title
        title: String,
        /// Category label
        #[arg(long, default_value = "")]
        category: String,
        /// Day (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },
    /// List goals for a day
    List {
        /// Day (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark a goal completed
    Done {
        /// Goal ID
        goal_id: String,
    },
    /// Mark a goal not completed
    Undo {
        /// Goal ID
        goal_id: String,
    },
    /// Delete a goal
    Remove {
        /// Goal ID
        goal_id: String,
    },
}

/// Execute the `habitual init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        server: config::ServerSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  server.bind  = {}", cfg.server.bind);
    println!("  server.port  = {}", cfg.server.port);
    println!();
    println!("Next: run `habitual db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `habitual db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = HabitualConfig::resolve(cli_db_url)?;

    println!("Initializing habitual database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("habitual db-init complete.");
    Ok(())
}

/// Parse a UUID argument, naming the kind of ID in the error.
pub(crate) fn parse_id(kind: &str, raw: &str) -> anyhow::Result<uuid::Uuid> {
    uuid::Uuid::parse_str(raw.trim()).with_context(|| format!("invalid {kind} ID: {raw}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Serve {
            bind,
            port,
            in_memory,
        } => {
            let resolved = HabitualConfig::resolve(cli.database_url.as_deref())?;
            let bind = bind.unwrap_or(resolved.server.bind);
            let port = port.unwrap_or(resolved.server.port);
            let source = resolved.server.replicate_source;

            if in_memory {
                tracing::warn!("serving from an in-memory store; state is lost on exit");
                serve_cmd::run_serve(Tracker::in_memory(), source, &bind, port).await?;
            } else {
                let db_pool = pool::create_pool(&resolved.db_config).await?;
                let result =
                    serve_cmd::run_serve(Tracker::postgres(db_pool.clone()), source, &bind, port)
                        .await;
                db_pool.close().await;
                result?;
            }
        }
        Commands::Habit { command } => {
            let resolved = HabitualConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let tracker = Tracker::postgres(db_pool.clone());
            let result = habit_cmds::run_habit_command(command, &tracker).await;
            db_pool.close().await;
            result?;
        }
        Commands::Plan { command } => {
            let resolved = HabitualConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let tracker = Tracker::postgres(db_pool.clone());
            let result = plan_cmds::run_plan_command(
                command,
                &tracker,
                resolved.server.replicate_source,
            )
            .await;
            db_pool.close().await;
            result?;
        }
        Commands::Done { habit_id, date } => {
            let resolved = HabitualConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let tracker = Tracker::postgres(db_pool.clone());
            let result = today_cmd::run_done(&tracker, &habit_id, date.as_deref()).await;
            db_pool.close().await;
            result?;
        }
        Commands::Today { date } => {
            let resolved = HabitualConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let tracker = Tracker::postgres(db_pool.clone());
            let result = today_cmd::run_today(&tracker, date.as_deref()).await;
            db_pool.close().await;
            result?;
        }
        Commands::Goal { command } => {
            let resolved = HabitualConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let tracker = Tracker::postgres(db_pool.clone());
            let result = goal_cmds::run_goal_command(command, &tracker).await;
            db_pool.close().await;
            result?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "habitual",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}
