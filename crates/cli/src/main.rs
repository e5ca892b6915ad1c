mod client;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use client::PhonebotClient;
use phonebot_models::{AvailabilityIn, ItemCreate, ItemUpdate, QuoteIn, QuoteItemIn};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "phonebot-cli")]
#[command(about = "CLI tool for quoting and managing tenant inventory")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, default_value = "http://localhost:8000")]
    server_url: String,

    /// Tenant key sent as X-Tenant
    #[arg(long, env = "PHONEBOT_TENANT")]
    tenant: Option<String>,

    /// Key sent as X-Admin-Key on inventory commands
    #[arg(long, env = "PHONEBOT_ADMIN_KEY")]
    admin_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Health check
    Health,

    /// Price a set of items for a date and ZIP
    Quote {
        #[arg(short, long)]
        date: String,

        #[arg(short, long)]
        zip: String,

        /// Item as `<id or name>[:qty]`, repeatable
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,
    },

    /// Check stock for a date
    Availability {
        #[arg(short, long)]
        date: String,

        /// Item as `<id or name>[:qty]`, repeatable
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,
    },

    /// Manage the tenant catalog
    Inventory {
        #[command(subcommand)]
        action: InventoryCommands,
    },
}

#[derive(Subcommand)]
enum InventoryCommands {
    /// List every catalog item
    List,

    /// Add an item
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        price: f64,

        #[arg(short, long, default_value = "0")]
        qty: u32,
    },

    /// Change fields of an existing item
    Update {
        item_id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        price: Option<f64>,

        #[arg(short, long)]
        qty: Option<u32>,
    },

    /// Delete an item
    Delete { item_id: String },
}

/// Parses `chair:10`, `Tent 20x20` or `<uuid>:2` into a request line.
fn parse_item_spec(spec: &str) -> Result<QuoteItemIn> {
    let (key, qty) = match spec.rsplit_once(':') {
        Some((key, qty)) => {
            let qty = qty
                .trim()
                .parse::<u32>()
                .map_err(|_| anyhow!("Invalid quantity in item '{}'", spec))?;
            (key.trim(), qty)
        }
        None => (spec.trim(), 1),
    };
    if key.is_empty() {
        return Err(anyhow!("Empty item in '{}'", spec));
    }
    let item = match Uuid::parse_str(key) {
        Ok(id) => QuoteItemIn {
            id: Some(id),
            name: None,
            qty,
        },
        Err(_) => QuoteItemIn {
            id: None,
            name: Some(key.to_string()),
            qty,
        },
    };
    Ok(item)
}

fn parse_items(specs: &[String]) -> Result<Vec<QuoteItemIn>> {
    specs.iter().map(|s| parse_item_spec(s)).collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = PhonebotClient::new(cli.server_url, cli.tenant, cli.admin_key);

    match cli.command {
        Commands::Health => {
            let health = client.health_check().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }

        Commands::Quote { date, zip, items } => {
            let request = QuoteIn {
                date,
                zip,
                items: parse_items(&items)?,
            };
            let (quote, partial) = client.quote(&request).await?;
            if partial {
                println!("Partial quote (some items are short on that date):");
            }
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }

        Commands::Availability { date, items } => {
            let request = AvailabilityIn {
                date,
                items: parse_items(&items)?,
            };
            let result = client.check_availability(&request).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Inventory { action } => match action {
            InventoryCommands::List => {
                let items = client.list_inventory().await?;
                println!("{}", serde_json::to_string_pretty(&items)?);
            }
            InventoryCommands::Add { name, price, qty } => {
                let item = client
                    .add_item(&ItemCreate {
                        name,
                        daily_price: price,
                        qty,
                    })
                    .await?;
                println!("Item added:");
                println!("{}", serde_json::to_string_pretty(&item)?);
            }
            InventoryCommands::Update {
                item_id,
                name,
                price,
                qty,
            } => {
                let update = ItemUpdate {
                    name,
                    daily_price: price,
                    qty,
                };
                let item = client.update_item(&item_id, &update).await?;
                println!("Item updated:");
                println!("{}", serde_json::to_string_pretty(&item)?);
            }
            InventoryCommands::Delete { item_id } => {
                client.delete_item(&item_id).await?;
                println!("Item deleted successfully: {}", item_id);
            }
        },
    }

    Ok(())
}
