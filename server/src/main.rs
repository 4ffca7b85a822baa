mod config;
mod employees;
mod http;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use entity::NewEmployee;
use platform_db::{EmployeeStore, MemoryEmployeeStore, MongoEmployeeStore, connect};
use platform_obs::{ObsConfig, init_tracing, shutdown_tracing};
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "employee-server", version, about = "Employee directory API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Insert sample employees into the configured collection.
    Seed,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,
    #[arg(long, help = "Keep employees in process memory instead of MongoDB")]
    in_memory: bool,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::from_env()?)?;
    let cli = Cli::parse();
    let app_config = Arc::new(AppConfig::load()?);
    let outcome = match cli.command {
        Command::Serve(cmd) => run_server(cmd, app_config).await,
        Command::Seed => run_seed(&app_config).await,
    };
    shutdown_tracing();
    outcome
}

async fn mongo_store(config: &AppConfig) -> Result<MongoEmployeeStore> {
    let pool = connect(&config.database)
        .await
        .context("connecting to MongoDB")?;
    Ok(MongoEmployeeStore::new(&pool, &config.database.collection))
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>) -> Result<()> {
    let store: Arc<dyn EmployeeStore> = if cmd.in_memory {
        warn!("serving from process memory; data is lost on exit");
        Arc::new(MemoryEmployeeStore::new())
    } else {
        let store = mongo_store(&config).await?;
        if let Err(err) = store.ping().await {
            warn!(error = %err, "MongoDB not reachable yet; requests will fail until it is");
        }
        Arc::new(store)
    };
    let state = AppState::new(store, config);
    http::serve(ServeConfig::from(&cmd), state).await
}

async fn run_seed(config: &AppConfig) -> Result<()> {
    let store = mongo_store(config).await?;
    for employee in sample_employees() {
        let stored = store.insert(employee).await?;
        info!(employee_id = %stored.id, name = %stored.name, "seeded employee");
    }
    Ok(())
}

fn sample_employees() -> Vec<NewEmployee> {
    let hired = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).single().unwrap_or_else(Utc::now);
    vec![
        NewEmployee {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            salary: 95_000.0,
            position: "Principal Engineer".into(),
            department: "Engineering".into(),
            hire_date: hired(2019, 4, 1),
        },
        NewEmployee {
            name: "Alan Turing".into(),
            email: "alan@example.com".into(),
            salary: 88_000.0,
            position: "Research Scientist".into(),
            department: "Research".into(),
            hire_date: hired(2020, 9, 14),
        },
        NewEmployee {
            name: "Katherine Johnson".into(),
            email: "katherine@example.com".into(),
            salary: 72_500.0,
            position: "Analyst".into(),
            department: "Finance".into(),
            hire_date: hired(2022, 2, 7),
        },
    ]
}
