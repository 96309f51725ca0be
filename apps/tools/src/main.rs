use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::{domain::ProductId, protocol::ProductFields};
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/catalog.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert a product directly into the reference server's database.
    Seed {
        name: String,
        price: String,
        description: String,
    },
    List,
    Remove {
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Seed {
            name,
            price,
            description,
        } => {
            let stored = storage
                .insert_product(&ProductFields {
                    name,
                    price,
                    description,
                })
                .await?;
            println!("created product_id={}", stored.product.id);
        }
        Command::List => {
            for stored in storage.list_products().await? {
                let p = &stored.product;
                println!(
                    "{}\t{}\t{}\t{}",
                    p.id,
                    p.name,
                    p.price,
                    stored.created_at.to_rfc3339()
                );
            }
        }
        Command::Remove { id } => {
            let id = ProductId::from(id.as_str());
            match storage.delete_product(&id).await? {
                Some(stored) => println!("removed product_id={} ({})", id, stored.product.name),
                None => bail!("no product with id {id}"),
            }
        }
    }

    Ok(())
}
