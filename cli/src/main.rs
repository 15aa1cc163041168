mod commands;
mod render;

use baselinker_core::{BaselinkerClient, Settings};
use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "baselinker", version, about = "Inspect Baselinker inventories and edit the second extra field")]
struct Cli {
    /// Connector URL (overrides BASELINKER_API_URL)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List inventories
    Inventories,
    /// Print every product of an inventory with both extra fields
    Report {
        /// Inventory ID (defaults to the first inventory)
        #[arg(long)]
        inventory: Option<i64>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Set the second extra field of one product
    SetField2 {
        #[arg(long)]
        inventory: i64,
        #[arg(long)]
        product: i64,
        #[arg(long)]
        value: String,
    },
    /// Browse products and edit the second extra field interactively
    Interactive {
        /// Inventory ID (prompted when omitted and several exist)
        #[arg(long)]
        inventory: Option<i64>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{}", format!("Error: {e:#}").as_str().red());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = Settings::from_env()?;
    if let Some(endpoint) = cli.endpoint {
        settings.endpoint = endpoint;
    }
    let client = BaselinkerClient::new(&settings);

    match cli.command {
        Commands::Inventories => commands::inventories::run(&client),
        Commands::Report { inventory, json } => commands::report::run(&client, inventory, json),
        Commands::SetField2 {
            inventory,
            product,
            value,
        } => commands::set_field::run(&client, inventory, product, &value),
        Commands::Interactive { inventory } => commands::interactive::run(&client, inventory),
    }
}
