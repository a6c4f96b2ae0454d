use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};

use clothshare::db;
use clothshare::domain::{RentalError, RentalEvent};
use clothshare::models::{item, rental};
use clothshare::services::rental_service::{self, CreateRental, RentalRole};

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    // In-memory SQLite for testing
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

// Helper to create a test user
async fn create_test_user(db: &DatabaseConnection, name: &str, email: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let user = clothshare::models::user::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set("hash".to_string()),
        rating: Set(0.0),
        review_count: Set(0),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = user.insert(db).await.expect("Failed to create user");
    res.id
}

// Helper to create a test item
async fn create_test_item(
    db: &DatabaseConnection,
    owner_id: i32,
    daily_price: f64,
    security_deposit: f64,
    weekly_discount: i32,
) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let item = item::ActiveModel {
        user_id: Set(owner_id),
        title: Set("Black Cocktail Dress".to_string()),
        daily_price: Set(daily_price),
        security_deposit: Set(security_deposit),
        weekly_discount: Set(weekly_discount),
        images: Set("[]".to_string()),
        status: Set("available".to_string()),
        view_count: Set(0),
        save_count: Set(0),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = item.insert(db).await.expect("Failed to create item");
    res.id
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn request(item_id: i32, renter_id: i32, start: &str, end: &str) -> CreateRental {
    CreateRental {
        item_id,
        renter_id,
        start_date: date(start),
        end_date: date(end),
        payment_reference: None,
    }
}

async fn item_status(db: &DatabaseConnection, id: i32) -> String {
    item::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("query failed")
        .expect("item missing")
        .status
}

async fn rental_status(db: &DatabaseConnection, id: i32) -> String {
    rental::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("query failed")
        .expect("rental missing")
        .status
}

#[tokio::test]
async fn test_full_lifecycle_happy_path() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let renter = create_test_user(&db, "Arjun", "arjun@test.com").await;
    let item_id = create_test_item(&db, owner, 100.0, 500.0, 0).await;

    // Create: rental pending, item pending, pricing copied onto the rental
    let created = rental_service::create_rental(&db, request(item_id, renter, "2024-06-01", "2024-06-03"))
        .await
        .expect("create failed");

    assert_eq!(created.status, "pending");
    assert_eq!(created.total_days, 3);
    assert_eq!(created.daily_rate, 100.0);
    assert!((created.total_amount - 300.0).abs() < 1e-9);
    assert_eq!(created.deposit_amount, 500.0);
    assert_eq!(created.owner_id, owner);
    assert_eq!(item_status(&db, item_id).await, "pending");

    // Accept by owner: rental confirmed, item rented
    let accepted = rental_service::transition(&db, created.id, owner, RentalEvent::Accept)
        .await
        .expect("accept failed");
    assert_eq!(accepted.status, "confirmed");
    assert_eq!(item_status(&db, item_id).await, "rented");

    // Complete by renter: rental completed, item available again
    let completed = rental_service::transition(&db, created.id, renter, RentalEvent::Complete)
        .await
        .expect("complete failed");
    assert_eq!(completed.status, "completed");
    assert_eq!(item_status(&db, item_id).await, "available");
}

#[tokio::test]
async fn test_complete_from_pending_fails_and_changes_nothing() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let renter = create_test_user(&db, "Arjun", "arjun@test.com").await;
    let item_id = create_test_item(&db, owner, 100.0, 0.0, 0).await;

    let created = rental_service::create_rental(&db, request(item_id, renter, "2024-06-01", "2024-06-03"))
        .await
        .expect("create failed");

    let err = rental_service::transition(&db, created.id, owner, RentalEvent::Complete)
        .await
        .unwrap_err();
    assert!(matches!(err, RentalError::InvalidTransition));

    // Both records unchanged
    assert_eq!(rental_status(&db, created.id).await, "pending");
    assert_eq!(item_status(&db, item_id).await, "pending");
}

#[tokio::test]
async fn test_reject_path_is_terminal() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let renter = create_test_user(&db, "Arjun", "arjun@test.com").await;
    let item_id = create_test_item(&db, owner, 100.0, 0.0, 0).await;

    let created = rental_service::create_rental(&db, request(item_id, renter, "2024-06-01", "2024-06-03"))
        .await
        .expect("create failed");

    let rejected = rental_service::transition(&db, created.id, owner, RentalEvent::Reject)
        .await
        .expect("reject failed");
    assert_eq!(rejected.status, "rejected");
    assert_eq!(item_status(&db, item_id).await, "available");

    // No further transitions from a terminal state
    let err = rental_service::transition(&db, created.id, owner, RentalEvent::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, RentalError::InvalidTransition));

    let err = rental_service::transition(&db, created.id, renter, RentalEvent::Complete)
        .await
        .unwrap_err();
    assert!(matches!(err, RentalError::InvalidTransition));
}

#[tokio::test]
async fn test_invalid_date_range_creates_nothing() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let renter = create_test_user(&db, "Arjun", "arjun@test.com").await;
    let item_id = create_test_item(&db, owner, 100.0, 0.0, 0).await;

    let err = rental_service::create_rental(&db, request(item_id, renter, "2024-01-10", "2024-01-05"))
        .await
        .unwrap_err();
    assert!(matches!(err, RentalError::InvalidDateRange));

    let rentals = rental::Entity::find().count(&db).await.unwrap();
    assert_eq!(rentals, 0);
    assert_eq!(item_status(&db, item_id).await, "available");
}

#[tokio::test]
async fn test_self_rental_rejected() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let item_id = create_test_item(&db, owner, 100.0, 0.0, 0).await;

    let err = rental_service::create_rental(&db, request(item_id, owner, "2024-06-01", "2024-06-03"))
        .await
        .unwrap_err();
    assert!(matches!(err, RentalError::SelfRentalForbidden));

    assert_eq!(item_status(&db, item_id).await, "available");
    assert_eq!(rental::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_second_create_observes_item_unavailable() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let renter_a = create_test_user(&db, "Arjun", "arjun@test.com").await;
    let renter_b = create_test_user(&db, "Priya", "priya@test.com").await;
    let item_id = create_test_item(&db, owner, 100.0, 0.0, 0).await;

    rental_service::create_rental(&db, request(item_id, renter_a, "2024-06-01", "2024-06-03"))
        .await
        .expect("first create failed");

    // Once the first create has committed, the item is no longer available:
    // the guarded status flip rejects the second request.
    let err = rental_service::create_rental(&db, request(item_id, renter_b, "2024-06-05", "2024-06-07"))
        .await
        .unwrap_err();
    assert!(matches!(err, RentalError::ItemUnavailable));

    assert_eq!(rental::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_creates_only_one_wins() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let renter_a = create_test_user(&db, "Arjun", "arjun@test.com").await;
    let renter_b = create_test_user(&db, "Priya", "priya@test.com").await;
    let item_id = create_test_item(&db, owner, 100.0, 0.0, 0).await;

    let (a, b) = tokio::join!(
        rental_service::create_rental(&db, request(item_id, renter_a, "2024-06-01", "2024-06-03")),
        rental_service::create_rental(&db, request(item_id, renter_b, "2024-06-05", "2024-06-07")),
    );

    // Exactly one request wins the guarded status flip
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let loser = if a.is_err() {
        a.unwrap_err()
    } else {
        b.unwrap_err()
    };
    assert!(matches!(loser, RentalError::ItemUnavailable));

    assert_eq!(rental::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(item_status(&db, item_id).await, "pending");
}

#[tokio::test]
async fn test_missing_item_is_unavailable() {
    let db = setup_test_db().await;
    let renter = create_test_user(&db, "Arjun", "arjun@test.com").await;

    let err = rental_service::create_rental(&db, request(999, renter, "2024-06-01", "2024-06-03"))
        .await
        .unwrap_err();
    assert!(matches!(err, RentalError::ItemUnavailable));
}

#[tokio::test]
async fn test_stranger_cannot_transition_regardless_of_status() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let renter = create_test_user(&db, "Arjun", "arjun@test.com").await;
    let stranger = create_test_user(&db, "Priya", "priya@test.com").await;
    let item_id = create_test_item(&db, owner, 100.0, 0.0, 0).await;

    let created = rental_service::create_rental(&db, request(item_id, renter, "2024-06-01", "2024-06-03"))
        .await
        .expect("create failed");

    for event in [RentalEvent::Accept, RentalEvent::Reject, RentalEvent::Complete] {
        let err = rental_service::transition(&db, created.id, stranger, event)
            .await
            .unwrap_err();
        assert!(matches!(err, RentalError::NotAuthorized));
    }

    // Still true after the rental moves on
    rental_service::transition(&db, created.id, owner, RentalEvent::Accept)
        .await
        .expect("accept failed");
    let err = rental_service::transition(&db, created.id, stranger, RentalEvent::Complete)
        .await
        .unwrap_err();
    assert!(matches!(err, RentalError::NotAuthorized));
}

#[tokio::test]
async fn test_renter_cannot_accept_own_request() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let renter = create_test_user(&db, "Arjun", "arjun@test.com").await;
    let item_id = create_test_item(&db, owner, 100.0, 0.0, 0).await;

    let created = rental_service::create_rental(&db, request(item_id, renter, "2024-06-01", "2024-06-03"))
        .await
        .expect("create failed");

    let err = rental_service::transition(&db, created.id, renter, RentalEvent::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, RentalError::NotAuthorized));
    assert_eq!(rental_status(&db, created.id).await, "pending");
}

#[tokio::test]
async fn test_weekly_discount_applied_on_create() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let renter = create_test_user(&db, "Arjun", "arjun@test.com").await;
    let item_id = create_test_item(&db, owner, 100.0, 0.0, 20).await;

    // 7 days at 100/day with 20% off
    let created = rental_service::create_rental(&db, request(item_id, renter, "2024-01-01", "2024-01-07"))
        .await
        .expect("create failed");

    assert_eq!(created.total_days, 7);
    assert!((created.total_amount - 560.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_rental_not_found() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "Maya", "maya@test.com").await;

    let err = rental_service::transition(&db, 42, user, RentalEvent::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, RentalError::RentalNotFound));
}

#[tokio::test]
async fn test_listings_join_item_and_counterparty() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let renter = create_test_user(&db, "Arjun", "arjun@test.com").await;
    let item_id = create_test_item(&db, owner, 100.0, 0.0, 0).await;

    rental_service::create_rental(&db, request(item_id, renter, "2024-06-01", "2024-06-03"))
        .await
        .expect("create failed");

    let my_rentals = rental_service::list_rentals(&db, renter, RentalRole::Renter)
        .await
        .expect("list failed");
    assert_eq!(my_rentals.len(), 1);
    assert_eq!(my_rentals[0].item_title, "Black Cocktail Dress");
    assert_eq!(my_rentals[0].owner_name, "Maya");
    assert_eq!(my_rentals[0].renter_name, "Arjun");

    let requests = rental_service::list_rentals(&db, owner, RentalRole::Owner)
        .await
        .expect("list failed");
    assert_eq!(requests.len(), 1);

    // The owner has no rentals as a renter
    let none = rental_service::list_rentals(&db, owner, RentalRole::Renter)
        .await
        .expect("list failed");
    assert!(none.is_empty());
}
