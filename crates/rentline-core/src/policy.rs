//! # Authorization Policy
//!
//! One capability check for every lifecycle transition.
//!
//! ## Check Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  authorize(actor, resource, relation)                                   │
//! │                                                                         │
//! │  Actor::System ─────────────────────────────────────────► allowed       │
//! │                                                                         │
//! │  Actor::Principal { id } ──► resource.holder(relation) == id ?          │
//! │                                   │                  │                  │
//! │                                  yes                 no                 │
//! │                                   ▼                  ▼                  │
//! │                                allowed      Forbidden { actor_id, ... } │
//! │                                                                         │
//! │  Relation       Resource   Holder                                      │
//! │  ───────────    ────────   ───────────────────────────                 │
//! │  CarOwner       Car        car.merchant_id                             │
//! │  Renter         Rental     rental.user_id                              │
//! │  RentalMerchant Rental     rental.merchant_id (booking-time snapshot)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Role checks ([`require_role`]) answer "may this kind of user do this at
//! all"; [`authorize`] answers "may this user touch this instance".

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Car, Rental, Role};

// =============================================================================
// Actor
// =============================================================================

/// Who is performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    /// An authenticated user.
    Principal { id: String, role: Role },
    /// The engine itself, e.g. the forced close during car deletion.
    /// Passes every ownership check.
    System,
}

impl Actor {
    pub fn principal(id: impl Into<String>, role: Role) -> Self {
        Actor::Principal {
            id: id.into(),
            role,
        }
    }

    /// The actor id used in errors and logs.
    pub fn id(&self) -> &str {
        match self {
            Actor::Principal { id, .. } => id,
            Actor::System => "system",
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Actor::Principal { role, .. } => Some(*role),
            Actor::System => None,
        }
    }

    #[inline]
    pub fn is_system(&self) -> bool {
        matches!(self, Actor::System)
    }
}

// =============================================================================
// Relations
// =============================================================================

/// A relation between an actor and a resource instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// The merchant who owns a car.
    CarOwner,
    /// The customer who booked a rental.
    Renter,
    /// The merchant who owned the car when the rental was booked.
    RentalMerchant,
}

/// A resource whose access is decided by relations.
pub trait Guarded {
    /// Resource kind used in `Forbidden` errors.
    const KIND: &'static str;

    fn resource_id(&self) -> &str;

    /// The user id holding `relation` on this resource, if the relation
    /// applies to this kind of resource.
    fn holder(&self, relation: Relation) -> Option<&str>;
}

impl Guarded for Car {
    const KIND: &'static str = "car";

    fn resource_id(&self) -> &str {
        &self.id
    }

    fn holder(&self, relation: Relation) -> Option<&str> {
        match relation {
            Relation::CarOwner => Some(&self.merchant_id),
            Relation::Renter | Relation::RentalMerchant => None,
        }
    }
}

impl Guarded for Rental {
    const KIND: &'static str = "rental";

    fn resource_id(&self) -> &str {
        &self.id
    }

    fn holder(&self, relation: Relation) -> Option<&str> {
        match relation {
            Relation::Renter => Some(&self.user_id),
            Relation::RentalMerchant => Some(&self.merchant_id),
            Relation::CarOwner => None,
        }
    }
}

// =============================================================================
// Checks
// =============================================================================

fn forbidden<R: Guarded>(actor: &Actor, resource: &R) -> CoreError {
    CoreError::Forbidden {
        actor_id: actor.id().to_string(),
        resource: R::KIND,
        resource_id: resource.resource_id().to_string(),
    }
}

/// Allows the actor if it holds `relation` on `resource`.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use rentline_core::policy::{authorize, Actor, Relation};
/// use rentline_core::{Rental, Role};
///
/// let rental = Rental {
///     id: "r-1".into(),
///     user_id: "alice".into(),
///     car_id: Some("c-1".into()),
///     merchant_id: "m-1".into(),
///     start_date: Utc::now(),
///     end_date: None,
///     fee_cents: None,
/// };
///
/// let alice = Actor::principal("alice", Role::Customer);
/// let bob = Actor::principal("bob", Role::Customer);
/// assert!(authorize(&alice, &rental, Relation::Renter).is_ok());
/// assert!(authorize(&bob, &rental, Relation::Renter).is_err());
/// assert!(authorize(&Actor::System, &rental, Relation::Renter).is_ok());
/// ```
pub fn authorize<R: Guarded>(actor: &Actor, resource: &R, relation: Relation) -> CoreResult<()> {
    authorize_any(actor, resource, &[relation])
}

/// Allows the actor if it holds any of `relations` on `resource`.
pub fn authorize_any<R: Guarded>(
    actor: &Actor,
    resource: &R,
    relations: &[Relation],
) -> CoreResult<()> {
    let Actor::Principal { id, .. } = actor else {
        return Ok(());
    };

    let holds = relations
        .iter()
        .any(|relation| resource.holder(*relation) == Some(id.as_str()));

    if holds {
        Ok(())
    } else {
        Err(forbidden(actor, resource))
    }
}

/// Requires the actor to have `role` before `operation` runs.
///
/// The system actor has no role and is always allowed.
pub fn require_role(actor: &Actor, role: Role, operation: &'static str) -> CoreResult<()> {
    match actor.role() {
        None => Ok(()),
        Some(actual) if actual == role => Ok(()),
        Some(_) => Err(CoreError::Forbidden {
            actor_id: actor.id().to_string(),
            resource: "operation",
            resource_id: operation.to_string(),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
