//! End-to-end tests of the service commands against an in-memory ledger.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rentline_core::{Actor, ManualClock, RentalStatus, Role, User};
use rentline_db::{Database, DbConfig};
use rentline_service::{
    seed, CreateCarRequest, CreateRentalRequest, ErrorCategory, ErrorCode, ListRequest,
    RegisterRequest, RentalService, ServiceConfig, UpdateCarRequest,
};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::task::JoinSet;
use uuid::Uuid;

// =============================================================================
// Fixtures
// =============================================================================

fn day0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
}

struct Harness {
    service: RentalService,
    clock: Arc<ManualClock>,
}

async fn harness_with(config: ServiceConfig) -> Harness {
    let clock = Arc::new(ManualClock::new(day0()));
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let service = RentalService::new(db, config, clock.clone());
    Harness { service, clock }
}

async fn harness() -> Harness {
    harness_with(ServiceConfig::default()).await
}

async fn signup(h: &Harness, username: &str, role: &str) -> Actor {
    let user = h
        .service
        .register(RegisterRequest::new(username, "secret-pass", Some(role)))
        .await
        .unwrap();
    Actor::principal(user.id, user.role)
}

async fn list_car(h: &Harness, merchant: &Actor, plate: &str, rate: &str) -> String {
    h.service
        .create_car(merchant, CreateCarRequest::new("Toyota Corolla", plate, rate))
        .await
        .unwrap()
        .id
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_register_roles_and_defaults() {
    let h = harness().await;

    let plain = h
        .service
        .register(RegisterRequest::new("dave", "secret-pass", None))
        .await
        .unwrap();
    assert_eq!(plain.role, Role::Customer);

    let legacy = h
        .service
        .register(RegisterRequest::new("erin", "secret-pass", Some("user")))
        .await
        .unwrap();
    assert_eq!(legacy.role, Role::Customer);

    let merchant = h
        .service
        .register(RegisterRequest::new("fleet", "secret-pass", Some("merchant")))
        .await
        .unwrap();
    assert_eq!(merchant.role, Role::Merchant);
    assert_eq!(merchant.created_at, day0());
}

#[tokio::test]
async fn test_register_rejections() {
    let h = harness().await;

    let err = h
        .service
        .register(RegisterRequest::new("gina", "secret-pass", Some("admin")))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidRole);

    let err = h
        .service
        .register(RegisterRequest {
            username: Some("gina".to_string()),
            ..RegisterRequest::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingFields);
    assert_eq!(err.category(), ErrorCategory::Validation);

    let err = h
        .service
        .register(RegisterRequest::new("gina", "abc", None))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    signup(&h, "gina", "customer").await;
    let err = h
        .service
        .register(RegisterRequest::new("gina", "other-pass", None))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UsernameTaken);
}

#[tokio::test]
async fn test_authenticate() {
    let h = harness().await;
    let alice = signup(&h, "alice", "customer").await;

    let session = h.service.authenticate("alice", "secret-pass").await.unwrap();
    assert_eq!(session.actor, alice);
    assert_eq!(session.user.username, "alice");

    let wrong = h.service.authenticate("alice", "wrong-pass").await.unwrap_err();
    let unknown = h.service.authenticate("nobody", "secret-pass").await.unwrap_err();
    assert_eq!(wrong.code, ErrorCode::InvalidCredentials);
    assert_eq!(wrong, unknown);
}

// =============================================================================
// Cars
// =============================================================================

#[tokio::test]
async fn test_create_car_checks() {
    let h = harness().await;
    let merchant = signup(&h, "fleet", "merchant").await;
    let customer = signup(&h, "alice", "customer").await;

    let car = h
        .service
        .create_car(&merchant, CreateCarRequest::new(" Honda Civic ", "DEF-2002", "45.5"))
        .await
        .unwrap();
    assert_eq!(car.model, "Honda Civic");
    assert_eq!(car.daily_rate, "45.50");
    assert_eq!(car.daily_rate_cents, 4550);
    assert_eq!(car.merchant_id, merchant.id());

    let err = h
        .service
        .create_car(&customer, CreateCarRequest::new("VW Golf", "GOLF-1", "50"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    let err = h
        .service
        .create_car(
            &merchant,
            CreateCarRequest {
                model: Some("VW Golf".to_string()),
                plate: Some("GOLF-1".to_string()),
                daily_rate: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingFields);

    let err = h
        .service
        .create_car(&merchant, CreateCarRequest::new("VW Golf", "GOLF-1", "0"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let err = h
        .service
        .create_car(&merchant, CreateCarRequest::new("VW Polo", "DEF-2002", "35"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicatePlate);
    assert_eq!(err.category(), ErrorCategory::Conflict);
}

#[tokio::test]
async fn test_update_car_ownership_and_patch() {
    let h = harness().await;
    let owner = signup(&h, "fleet-one", "merchant").await;
    let rival = signup(&h, "fleet-two", "merchant").await;
    let car_id = list_car(&h, &owner, "ABC-1001", "40").await;
    list_car(&h, &rival, "XYZ-9", "30").await;

    let err = h
        .service
        .update_car(
            &rival,
            &car_id,
            UpdateCarRequest {
                daily_rate: Some("10".to_string()),
                ..UpdateCarRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    h.clock.advance(Duration::hours(1));
    let updated = h
        .service
        .update_car(
            &owner,
            &car_id,
            UpdateCarRequest {
                daily_rate: Some("42.75".to_string()),
                ..UpdateCarRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.daily_rate, "42.75");
    assert_eq!(updated.plate, "ABC-1001");
    assert_eq!(updated.updated_at, day0() + Duration::hours(1));

    let unchanged = h
        .service
        .update_car(&owner, &car_id, UpdateCarRequest::default())
        .await
        .unwrap();
    assert_eq!(unchanged, updated);

    let err = h
        .service
        .update_car(
            &owner,
            &car_id,
            UpdateCarRequest {
                plate: Some("XYZ-9".to_string()),
                ..UpdateCarRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicatePlate);

    let err = h
        .service
        .update_car(&owner, "missing-car", UpdateCarRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_unbillable_rate_is_rejected() {
    let h = harness().await;
    let merchant = signup(&h, "fleet", "merchant").await;

    let err = h
        .service
        .create_car(
            &merchant,
            CreateCarRequest::new("Gold Plated", "GOLD-1", "92233720368547758.07"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let car_id = list_car(&h, &merchant, "GOLD-2", "1000000.00").await;
    let err = h
        .service
        .update_car(
            &merchant,
            &car_id,
            UpdateCarRequest {
                daily_rate: Some("1000000.01".to_string()),
                ..UpdateCarRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    // The largest accepted rate still closes cleanly
    let customer = signup(&h, "alice", "customer").await;
    let rental = h
        .service
        .create_rental(&customer, CreateRentalRequest::new(&car_id))
        .await
        .unwrap();
    h.clock.advance(Duration::hours(25));
    let closed = h.service.close_rental(&customer, &rental.id).await.unwrap();
    assert_eq!(closed.fee.as_deref(), Some("2000000.00"));
}

#[tokio::test]
async fn test_car_listings_use_configured_page_size() {
    let h = harness_with(ServiceConfig {
        default_page_size: 2,
        ..ServiceConfig::default()
    })
    .await;
    let m1 = signup(&h, "fleet-one", "merchant").await;
    let m2 = signup(&h, "fleet-two", "merchant").await;
    let viewer = signup(&h, "alice", "customer").await;

    for i in 0..3 {
        h.clock.advance(Duration::minutes(1));
        list_car(&h, &m1, &format!("ONE-{i}"), "40").await;
    }
    h.clock.advance(Duration::minutes(1));
    list_car(&h, &m2, "TWO-0", "40").await;

    let first = h
        .service
        .list_cars(&viewer, ListRequest::default())
        .await
        .unwrap();
    assert_eq!(first.per_page, 2);
    assert_eq!(first.total, 4);
    assert_eq!(first.pages, 2);
    assert_eq!(first.items[0].plate, "TWO-0");
    assert!(first.has_next && !first.has_prev);

    let theirs = h
        .service
        .list_merchant_cars(&viewer, m1.id(), ListRequest::page(1, 10))
        .await
        .unwrap();
    assert_eq!(theirs.total, 3);
    assert_eq!(theirs.items[0].plate, "ONE-2");

    let past_end = h
        .service
        .list_cars(&viewer, ListRequest::page(5, 2))
        .await
        .unwrap();
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.page, 5);
}

// =============================================================================
// Rentals
// =============================================================================

#[tokio::test]
async fn test_fee_scenario() {
    let h = harness().await;
    let merchant = signup(&h, "fleet", "merchant").await;
    let a = signup(&h, "alice", "customer").await;
    let b = signup(&h, "bob", "customer").await;
    let car_c = list_car(&h, &merchant, "CAR-C", "40.00").await;
    let car_d = list_car(&h, &merchant, "CAR-D", "40.00").await;

    let ra = h
        .service
        .create_rental(&a, CreateRentalRequest::new(&car_c))
        .await
        .unwrap();
    let rb = h
        .service
        .create_rental(&b, CreateRentalRequest::new(&car_d))
        .await
        .unwrap();
    assert_eq!(ra.status, RentalStatus::Open);
    assert_eq!(ra.start_date, day0());
    assert_eq!(ra.merchant_id, merchant.id());
    assert!(ra.fee.is_none());

    h.clock.advance(Duration::hours(14));
    let closed_a = h.service.close_rental(&a, &ra.id).await.unwrap();
    assert_eq!(closed_a.fee.as_deref(), Some("40.00"));
    assert_eq!(closed_a.end_date, Some(day0() + Duration::hours(14)));

    h.clock.set(day0() + Duration::hours(48));
    let closed_b = h.service.close_rental(&b, &rb.id).await.unwrap();
    assert_eq!(closed_b.fee.as_deref(), Some("80.00"));
    assert_eq!(closed_b.status, RentalStatus::Closed);
}

#[tokio::test]
async fn test_booking_conflicts_report_blocking_rental() {
    let h = harness().await;
    let merchant = signup(&h, "fleet", "merchant").await;
    let a = signup(&h, "alice", "customer").await;
    let b = signup(&h, "bob", "customer").await;
    let car_1 = list_car(&h, &merchant, "CAR-1", "40").await;
    let car_2 = list_car(&h, &merchant, "CAR-2", "40").await;

    let held = h
        .service
        .create_rental(&a, CreateRentalRequest::new(&car_1))
        .await
        .unwrap();

    let err = h
        .service
        .create_rental(&a, CreateRentalRequest::new(&car_2))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UserAlreadyRenting);
    assert_eq!(err.rental_id.as_deref(), Some(held.id.as_str()));
    assert!(err.is_retryable());

    let err = h
        .service
        .create_rental(&b, CreateRentalRequest::new(&car_1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CarAlreadyRented);
    assert_eq!(err.rental_id.as_deref(), Some(held.id.as_str()));

    let err = h
        .service
        .create_rental(&b, CreateRentalRequest::new("no-such-car"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    let err = h
        .service
        .create_rental(&b, CreateRentalRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingFields);

    let err = h
        .service
        .create_rental(&merchant, CreateRentalRequest::new(&car_2))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);
}

#[tokio::test]
async fn test_close_rental_rejections() {
    let h = harness().await;
    let merchant = signup(&h, "fleet", "merchant").await;
    let a = signup(&h, "alice", "customer").await;
    let b = signup(&h, "bob", "customer").await;
    let car = list_car(&h, &merchant, "CAR-1", "40").await;

    let rental = h
        .service
        .create_rental(&a, CreateRentalRequest::new(&car))
        .await
        .unwrap();

    let err = h.service.close_rental(&b, &rental.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    let err = h.service.close_rental(&merchant, &rental.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    h.clock.advance(Duration::hours(30));
    let first = h.service.close_rental(&a, &rental.id).await.unwrap();
    assert_eq!(first.fee.as_deref(), Some("80.00"));

    h.clock.advance(Duration::days(3));
    let err = h.service.close_rental(&a, &rental.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyClosed);
    assert_eq!(err.rental_id.as_deref(), Some(rental.id.as_str()));
    assert!(!err.is_retryable());

    let again = h.service.get_rental(&a, &rental.id).await.unwrap();
    assert_eq!(again, first);

    let err = h.service.close_rental(&a, "missing").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_rental_visibility() {
    let h = harness().await;
    let owner = signup(&h, "fleet-one", "merchant").await;
    let other_merchant = signup(&h, "fleet-two", "merchant").await;
    let a = signup(&h, "alice", "customer").await;
    let b = signup(&h, "bob", "customer").await;
    let car = list_car(&h, &owner, "CAR-1", "40").await;

    let rental = h
        .service
        .create_rental(&a, CreateRentalRequest::new(&car))
        .await
        .unwrap();

    assert!(h.service.get_rental(&a, &rental.id).await.is_ok());
    assert!(h.service.get_rental(&owner, &rental.id).await.is_ok());
    let err = h.service.get_rental(&b, &rental.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);
    let err = h.service.get_rental(&other_merchant, &rental.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    let mine = h
        .service
        .list_user_rentals(&a, a.id(), ListRequest::default())
        .await
        .unwrap();
    assert_eq!(mine.total, 1);
    assert_eq!(mine.items[0].id, rental.id);

    let err = h
        .service
        .list_user_rentals(&b, a.id(), ListRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    let err = h
        .service
        .list_merchant_rentals(&a, ListRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    let none = h
        .service
        .list_merchant_rentals(&other_merchant, ListRequest::default())
        .await
        .unwrap();
    assert_eq!(none.total, 0);
}

// =============================================================================
// Car Removal
// =============================================================================

#[tokio::test]
async fn test_delete_car_closes_open_rental_and_keeps_history() {
    let h = harness().await;
    let owner = signup(&h, "fleet", "merchant").await;
    let rival = signup(&h, "rival", "merchant").await;
    let a = signup(&h, "alice", "customer").await;
    let b = signup(&h, "bob", "customer").await;
    let car = list_car(&h, &owner, "CAR-1", "40").await;

    let past = h
        .service
        .create_rental(&a, CreateRentalRequest::new(&car))
        .await
        .unwrap();
    h.clock.advance(Duration::hours(5));
    h.service.close_rental(&a, &past.id).await.unwrap();

    let open = h
        .service
        .create_rental(&b, CreateRentalRequest::new(&car))
        .await
        .unwrap();

    let err = h.service.delete_car(&rival, &car).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);
    let err = h.service.delete_car(&b, &car).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    h.clock.advance(Duration::hours(25));
    let removal = h.service.delete_car(&owner, &car).await.unwrap();
    assert_eq!(removal.car_id, car);
    assert_eq!(removal.closed_rental_id.as_deref(), Some(open.id.as_str()));
    assert_eq!(removal.closed_rental_fee.as_deref(), Some("80.00"));
    assert_eq!(removal.detached_rentals, 2);

    let closed = h.service.get_rental(&b, &open.id).await.unwrap();
    assert_eq!(closed.status, RentalStatus::Closed);
    assert_eq!(closed.car_id, None);
    assert_eq!(closed.fee.as_deref(), Some("80.00"));

    let history = h
        .service
        .list_merchant_rentals(&owner, ListRequest::default())
        .await
        .unwrap();
    assert_eq!(history.total, 2);
    assert!(history.items.iter().all(|r| r.car_id.is_none()));

    let err = h.service.delete_car(&owner, &car).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    // The customer is free to rent again
    let next = list_car(&h, &owner, "CAR-2", "40").await;
    assert!(h
        .service
        .create_rental(&b, CreateRentalRequest::new(&next))
        .await
        .is_ok());
}

// =============================================================================
// Seed
// =============================================================================

#[tokio::test]
async fn test_seed_populates_and_resets() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let now = day0() + Duration::days(10);

    let summary = seed::seed(db.clone(), ServiceConfig::default(), now)
        .await
        .unwrap();
    assert_eq!(summary.merchants.len(), 2);
    assert_eq!(summary.customers.len(), 3);
    assert_eq!(summary.cars.len(), 4);

    let fees: Vec<Option<&str>> = summary.rentals.iter().map(|r| r.fee.as_deref()).collect();
    assert_eq!(fees, vec![Some("120.00"), Some("76.50"), None]);
    assert_eq!(summary.rentals[2].start_date, now - Duration::hours(10));

    // Running again starts from an empty ledger
    seed::seed(db.clone(), ServiceConfig::default(), now)
        .await
        .unwrap();
    assert_eq!(db.users().count().await.unwrap(), 5);
    assert_eq!(db.rentals().count_open().await.unwrap(), 1);

    let service = RentalService::new(db, ServiceConfig::default(), Arc::new(ManualClock::new(now)));
    let carol = service.authenticate("carol", "carol123").await.unwrap();
    let rentals = service
        .list_user_rentals(&carol.actor, carol.actor.id(), ListRequest::default())
        .await
        .unwrap();
    assert_eq!(rentals.total, 1);
    assert_eq!(rentals.items[0].status, RentalStatus::Open);
}

// =============================================================================
// Races
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_customers_get_one_rental() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        database_path: dir.path().join("race.db"),
        max_connections: 8,
        busy_timeout: StdDuration::from_secs(10),
        ..ServiceConfig::default()
    };
    let service = RentalService::connect_with_clock(config, Arc::new(ManualClock::new(day0())))
        .await
        .unwrap();

    let merchant = service
        .register(RegisterRequest::new("fleet", "secret-pass", Some("merchant")))
        .await
        .unwrap();
    let merchant = Actor::principal(merchant.id, merchant.role);
    let car = service
        .create_car(&merchant, CreateCarRequest::new("VW Golf", "GOLF-1", "50"))
        .await
        .unwrap();

    // Stored directly: hashing eight passwords adds nothing to this test
    let mut racers = Vec::new();
    for i in 0..8 {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: format!("racer-{i}"),
            password_hash: "unused".to_string(),
            role: Role::Customer,
            created_at: day0(),
        };
        service.database().users().insert(&user).await.unwrap();
        racers.push(Actor::principal(user.id, Role::Customer));
    }

    let mut set = JoinSet::new();
    for actor in racers {
        let service = service.clone();
        let car_id = car.id.clone();
        set.spawn(async move {
            service
                .create_rental(&actor, CreateRentalRequest::new(&car_id))
                .await
        });
    }

    let mut winners = Vec::new();
    let mut losers = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined.unwrap() {
            Ok(rental) => winners.push(rental),
            Err(err) => losers.push(err),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(losers.len(), 7);
    for err in &losers {
        assert_eq!(err.code, ErrorCode::CarAlreadyRented);
        assert_eq!(err.rental_id.as_deref(), Some(winners[0].id.as_str()));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_car_patches_keep_both_fields() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        database_path: dir.path().join("patch.db"),
        max_connections: 4,
        busy_timeout: StdDuration::from_secs(10),
        ..ServiceConfig::default()
    };
    let service = RentalService::connect_with_clock(config, Arc::new(ManualClock::new(day0())))
        .await
        .unwrap();

    let merchant = service
        .register(RegisterRequest::new("fleet", "secret-pass", Some("merchant")))
        .await
        .unwrap();
    let merchant = Actor::principal(merchant.id, merchant.role);

    for round in 0..40 {
        let car = service
            .create_car(
                &merchant,
                CreateCarRequest::new("Old", &format!("PATCH-{round}"), "40"),
            )
            .await
            .unwrap();

        let mut set = JoinSet::new();
        for request in [
            UpdateCarRequest {
                model: Some("New".to_string()),
                ..UpdateCarRequest::default()
            },
            UpdateCarRequest {
                daily_rate: Some("99".to_string()),
                ..UpdateCarRequest::default()
            },
        ] {
            let service = service.clone();
            let merchant = merchant.clone();
            let car_id = car.id.clone();
            set.spawn(async move { service.update_car(&merchant, &car_id, request).await });
        }
        while let Some(joined) = set.join_next().await {
            joined.unwrap().unwrap();
        }

        let stored = service
            .database()
            .cars()
            .get_by_id(&car.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.model, "New", "round {round}");
        assert_eq!(stored.daily_rate_cents, 9900, "round {round}");
    }
}
