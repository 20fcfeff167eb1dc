//! # Seed Tool
//!
//! Resets the configured database and fills it with demo data.
//!
//! ```text
//! RENTLINE_DB_PATH=./rentline.db cargo run --bin seed
//! ```
//!
//! Every existing user, car and rental in that database is deleted.

use chrono::Utc;
use rentline_db::Database;
use rentline_service::{init_tracing, seed, ServiceConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ServiceConfig::load()?;
    info!(path = %config.database_path.display(), "Seeding database");

    let db = Database::new(config.db_config()).await?;
    let summary = seed::seed(db.clone(), config, Utc::now()).await?;

    println!("Seed data inserted:");
    println!("  Merchants: {:?}", summary.merchants);
    println!("  Users:     {:?}", summary.customers);
    println!(
        "  Cars:      {:?}",
        summary.cars.iter().map(|c| c.plate.as_str()).collect::<Vec<_>>()
    );
    println!(
        "  Rentals:   {:?}",
        summary.rentals.iter().map(|r| r.id.as_str()).collect::<Vec<_>>()
    );

    db.close().await;
    Ok(())
}
