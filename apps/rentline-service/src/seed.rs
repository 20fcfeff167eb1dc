//! # Demo Data
//!
//! Resets a ledger and fills it through the regular commands, so the demo
//! data obeys every booking rule.
//!
//! ```text
//! now-5d   alice books ABC-1001 (40.00/day)
//! now-3d   bob   books GHI-3003 (38.25/day)
//! now-2d   alice returns        → 3 days → 120.00
//! now-1d   bob   returns        → 2 days →  76.50
//! now-10h  carol books DEF-2002 (45.50/day), still open
//! ```

use chrono::{DateTime, Duration, Utc};
use rentline_core::policy::Actor;
use rentline_core::ManualClock;
use rentline_db::Database;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::commands::account::RegisterRequest;
use crate::commands::car::{CarDto, CreateCarRequest};
use crate::commands::rental::{CreateRentalRequest, RentalDto};
use crate::config::ServiceConfig;
use crate::error::ApiResult;
use crate::service::RentalService;

const MERCHANTS: [(&str, &str); 2] = [
    ("rent_co_alpha", "AlphaPass1"),
    ("rent_co_bravo", "BravoPass2"),
];

const CUSTOMERS: [(&str, &str); 3] = [
    ("alice", "alice123"),
    ("bob", "bob123"),
    ("carol", "carol123"),
];

/// (owning merchant index, model, plate, daily rate)
const CARS: [(usize, &str, &str, &str); 4] = [
    (0, "Toyota Corolla", "ABC-1001", "40.00"),
    (0, "Honda Civic", "DEF-2002", "45.50"),
    (1, "Ford Focus", "GHI-3003", "38.25"),
    (1, "Chevy Malibu", "JKL-4004", "50.00"),
];

/// What the seed run created.
#[derive(Debug, Clone, Serialize)]
pub struct SeedSummary {
    pub merchants: Vec<String>,
    pub customers: Vec<String>,
    pub cars: Vec<CarDto>,
    pub rentals: Vec<RentalDto>,
}

/// Clears `db` and inserts the demo data, timed relative to `now`.
pub async fn seed(
    db: Database,
    config: ServiceConfig,
    now: DateTime<Utc>,
) -> ApiResult<SeedSummary> {
    db.clear_all().await?;

    let clock = Arc::new(ManualClock::new(now - Duration::days(7)));
    let service = RentalService::new(db, config, clock.clone());

    let mut merchants = Vec::with_capacity(MERCHANTS.len());
    for (username, password) in MERCHANTS {
        merchants.push(register(&service, username, password, "merchant").await?);
    }

    let mut customers = Vec::with_capacity(CUSTOMERS.len());
    for (username, password) in CUSTOMERS {
        customers.push(register(&service, username, password, "user").await?);
    }

    let mut cars = Vec::with_capacity(CARS.len());
    for (owner, model, plate, rate) in CARS {
        let car = service
            .create_car(&merchants[owner], CreateCarRequest::new(model, plate, rate))
            .await?;
        cars.push(car);
    }

    let (alice, bob, carol) = (&customers[0], &customers[1], &customers[2]);

    clock.set(now - Duration::days(5));
    let past1 = service
        .create_rental(alice, CreateRentalRequest::new(&cars[0].id))
        .await?;

    clock.set(now - Duration::days(3));
    let past2 = service
        .create_rental(bob, CreateRentalRequest::new(&cars[2].id))
        .await?;

    clock.set(now - Duration::days(2));
    let past1 = service.close_rental(alice, &past1.id).await?;

    clock.set(now - Duration::days(1));
    let past2 = service.close_rental(bob, &past2.id).await?;

    clock.set(now - Duration::hours(10));
    let active = service
        .create_rental(carol, CreateRentalRequest::new(&cars[1].id))
        .await?;

    let summary = SeedSummary {
        merchants: MERCHANTS.iter().map(|(name, _)| name.to_string()).collect(),
        customers: CUSTOMERS.iter().map(|(name, _)| name.to_string()).collect(),
        cars,
        rentals: vec![past1, past2, active],
    };

    info!(
        merchants = summary.merchants.len(),
        customers = summary.customers.len(),
        cars = summary.cars.len(),
        rentals = summary.rentals.len(),
        "Seed data inserted"
    );

    Ok(summary)
}

async fn register(
    service: &RentalService,
    username: &str,
    password: &str,
    role: &str,
) -> ApiResult<Actor> {
    let user = service
        .register(RegisterRequest::new(username, password, Some(role)))
        .await?;
    Ok(Actor::principal(user.id, user.role))
}
