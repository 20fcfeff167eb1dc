//! # Rental Service
//!
//! The handle every operation runs on.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RentalService                                    │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────────────┐  │
//! │  │   Database   │  │  BookingEngine   │  │     ServiceConfig        │  │
//! │  │ repositories │  │ open / close /   │  │ default page size, pool  │  │
//! │  │ (plain I/O)  │  │ car removal      │  │ settings                 │  │
//! │  └──────────────┘  └──────────────────┘  └──────────────────────────┘  │
//! │                                                                         │
//! │  Cheap to clone: the pool and the clock are shared handles.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rentline_core::policy::Actor;
use rentline_core::{Clock, CoreError, PageRequest, SystemClock};
use rentline_db::{BookingEngine, Database};
use std::sync::Arc;
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::ApiResult;

/// Service facade over the ledger store and the booking engine.
#[derive(Debug, Clone)]
pub struct RentalService {
    pub(crate) db: Database,
    pub(crate) booking: BookingEngine,
    pub(crate) config: ServiceConfig,
}

impl RentalService {
    /// Connects to the configured database on the system clock.
    pub async fn connect(config: ServiceConfig) -> ApiResult<Self> {
        Self::connect_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Connects to the configured database, reading time from `clock`.
    pub async fn connect_with_clock(
        config: ServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> ApiResult<Self> {
        let db = Database::new(config.db_config()).await?;
        info!(path = %config.database_path.display(), "Rental service ready");
        Ok(Self::new(db, config, clock))
    }

    /// Wraps an already opened database.
    pub fn new(db: Database, config: ServiceConfig, clock: Arc<dyn Clock>) -> Self {
        let booking = db.booking_with_clock(clock);
        RentalService {
            db,
            booking,
            config,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Page request with the configured default size.
    pub(crate) fn page_request(&self, page: Option<u32>, per_page: Option<u32>) -> PageRequest {
        PageRequest::from_parts(page, per_page, self.config.default_page_size)
    }
}

/// The acting user's id, for operations the system actor cannot perform
/// on its own behalf (owning a car, renting one).
pub(crate) fn principal_id<'a>(actor: &'a Actor, operation: &'static str) -> ApiResult<&'a str> {
    match actor {
        Actor::Principal { id, .. } => Ok(id),
        Actor::System => Err(CoreError::Forbidden {
            actor_id: actor.id().to_string(),
            resource: "operation",
            resource_id: operation.to_string(),
        }
        .into()),
    }
}
