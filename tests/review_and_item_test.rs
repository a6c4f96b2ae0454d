use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use clothshare::db;
use clothshare::domain::RentalEvent;
use clothshare::models::{item, user};
use clothshare::services::item_service::{self, CreateItemInput, ItemFilter, ServiceError};
use clothshare::services::rental_service::{self, CreateRental};
use clothshare::services::review_service::{self, CreateReviewInput};

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_test_user(db: &DatabaseConnection, name: &str, email: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let user = user::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set("hash".to_string()),
        rating: Set(0.0),
        review_count: Set(0),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    user.insert(db).await.expect("Failed to create user").id
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn listing(title: &str, daily_price: f64) -> CreateItemInput {
    CreateItemInput {
        title: title.to_string(),
        description: None,
        category: Some("western".to_string()),
        subcategory: None,
        size: Some("M".to_string()),
        color: None,
        brand: None,
        item_condition: None,
        daily_price,
        security_deposit: Some(500.0),
        weekly_discount: Some(10),
        images: Some(vec!["https://cdn.test/dress.jpg".to_string()]),
    }
}

async fn completed_rental(
    db: &DatabaseConnection,
    item_id: i32,
    owner: i32,
    renter: i32,
) -> i32 {
    let created = rental_service::create_rental(
        db,
        CreateRental {
            item_id,
            renter_id: renter,
            start_date: date("2024-06-01"),
            end_date: date("2024-06-03"),
            payment_reference: None,
        },
    )
    .await
    .expect("create failed");
    rental_service::transition(db, created.id, owner, RentalEvent::Accept)
        .await
        .expect("accept failed");
    rental_service::transition(db, created.id, renter, RentalEvent::Complete)
        .await
        .expect("complete failed");
    created.id
}

#[tokio::test]
async fn test_item_crud_and_filters() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;

    let created = item_service::create_item(&db, owner, listing("Black Cocktail Dress", 300.0))
        .await
        .expect("create failed");
    assert_eq!(created.status, "available");

    item_service::create_item(&db, owner, listing("Navy Blue Blazer", 250.0))
        .await
        .expect("create failed");

    // Search filter hits only the dress
    let found = item_service::list_items(
        &db,
        ItemFilter {
            search: Some("Cocktail".to_string()),
            ..Default::default()
        },
    )
    .await
    .expect("list failed");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Black Cocktail Dress");
    assert_eq!(found[0].owner_name, "Maya");
    assert_eq!(found[0].images, vec!["https://cdn.test/dress.jpg".to_string()]);

    // Price filter
    let cheap = item_service::list_items(
        &db,
        ItemFilter {
            max_price: Some(260.0),
            ..Default::default()
        },
    )
    .await
    .expect("list failed");
    assert_eq!(cheap.len(), 1);
    assert_eq!(cheap[0].title, "Navy Blue Blazer");

    // Detail fetch bumps the view counter
    let details = item_service::get_item(&db, created.id).await.expect("get failed");
    assert_eq!(details.summary.id, created.id);
    let reloaded = item::Entity::find_by_id(created.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.view_count, 1);
}

#[tokio::test]
async fn test_create_item_validation() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;

    let err = item_service::create_item(&db, owner, listing("Dress", 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let mut bad_discount = listing("Dress", 100.0);
    bad_discount.weekly_discount = Some(120);
    let err = item_service::create_item(&db, owner, bad_discount)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let mut blank = listing("  ", 100.0);
    blank.title = "  ".to_string();
    let err = item_service::create_item(&db, owner, blank).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_update_item_is_owner_only_and_keeps_status() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let other = create_test_user(&db, "Arjun", "arjun@test.com").await;

    let created = item_service::create_item(&db, owner, listing("Black Cocktail Dress", 300.0))
        .await
        .expect("create failed");

    let err = item_service::update_item(&db, created.id, other, Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));

    let updated = item_service::update_item(
        &db,
        created.id,
        owner,
        clothshare::services::item_service::UpdateItemInput {
            daily_price: Some(350.0),
            ..Default::default()
        },
    )
    .await
    .expect("update failed");
    assert_eq!(updated.daily_price, 350.0);
    assert_eq!(updated.status, "available");
}

#[tokio::test]
async fn test_delete_item_blocked_while_rental_active() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let renter = create_test_user(&db, "Arjun", "arjun@test.com").await;

    let created = item_service::create_item(&db, owner, listing("Black Cocktail Dress", 300.0))
        .await
        .expect("create failed");

    rental_service::create_rental(
        &db,
        CreateRental {
            item_id: created.id,
            renter_id: renter,
            start_date: date("2024-06-01"),
            end_date: date("2024-06-03"),
            payment_reference: None,
        },
    )
    .await
    .expect("rental create failed");

    let err = item_service::delete_item(&db, created.id, owner).await.unwrap_err();
    assert!(matches!(err, ServiceError::HasActiveRental));

    // After the request is rejected the listing can go
    let rental = clothshare::models::rental::Entity::find()
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    rental_service::transition(&db, rental.id, owner, RentalEvent::Reject)
        .await
        .expect("reject failed");

    item_service::delete_item(&db, created.id, owner)
        .await
        .expect("delete failed");
    assert!(item::Entity::find_by_id(created.id).one(&db).await.unwrap().is_none());
}

#[tokio::test]
async fn test_review_updates_rating_aggregate() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let renter = create_test_user(&db, "Arjun", "arjun@test.com").await;
    let item_id = item_service::create_item(&db, owner, listing("Black Cocktail Dress", 300.0))
        .await
        .expect("create failed")
        .id;
    let rental_id = completed_rental(&db, item_id, owner, renter).await;

    let review = review_service::create_review(
        &db,
        renter,
        CreateReviewInput {
            rental_id,
            rating: 4,
            comment: Some("Great condition".to_string()),
        },
    )
    .await
    .expect("review failed");
    assert_eq!(review.reviewee_id, owner);
    assert_eq!(review.item_id, Some(item_id));

    let reviewed_owner = user::Entity::find_by_id(owner).one(&db).await.unwrap().unwrap();
    assert_eq!(reviewed_owner.review_count, 1);
    assert!((reviewed_owner.rating - 4.0).abs() < 1e-9);

    // Owner reviews the renter back; the renter's aggregate moves too
    review_service::create_review(
        &db,
        owner,
        CreateReviewInput {
            rental_id,
            rating: 5,
            comment: None,
        },
    )
    .await
    .expect("review failed");

    let reviewed_renter = user::Entity::find_by_id(renter).one(&db).await.unwrap().unwrap();
    assert_eq!(reviewed_renter.review_count, 1);
    assert!((reviewed_renter.rating - 5.0).abs() < 1e-9);

    // Reviews surface on the item detail
    let reviews = review_service::list_item_reviews(&db, item_id).await.expect("list failed");
    assert_eq!(reviews.len(), 2);
}

#[tokio::test]
async fn test_review_rules() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "Maya", "maya@test.com").await;
    let renter = create_test_user(&db, "Arjun", "arjun@test.com").await;
    let stranger = create_test_user(&db, "Priya", "priya@test.com").await;
    let item_id = item_service::create_item(&db, owner, listing("Black Cocktail Dress", 300.0))
        .await
        .expect("create failed")
        .id;

    // Not completed yet
    let created = rental_service::create_rental(
        &db,
        CreateRental {
            item_id,
            renter_id: renter,
            start_date: date("2024-06-01"),
            end_date: date("2024-06-03"),
            payment_reference: None,
        },
    )
    .await
    .expect("create failed");

    let err = review_service::create_review(
        &db,
        renter,
        CreateReviewInput {
            rental_id: created.id,
            rating: 5,
            comment: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        clothshare::services::review_service::ServiceError::InvalidState(_)
    ));

    rental_service::transition(&db, created.id, owner, RentalEvent::Accept)
        .await
        .unwrap();
    rental_service::transition(&db, created.id, renter, RentalEvent::Complete)
        .await
        .unwrap();

    // Outsiders cannot review
    let err = review_service::create_review(
        &db,
        stranger,
        CreateReviewInput {
            rental_id: created.id,
            rating: 5,
            comment: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        clothshare::services::review_service::ServiceError::InvalidState(_)
    ));

    // Rating bounds
    let err = review_service::create_review(
        &db,
        renter,
        CreateReviewInput {
            rental_id: created.id,
            rating: 6,
            comment: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        clothshare::services::review_service::ServiceError::Validation(_)
    ));

    // One review per participant per rental
    review_service::create_review(
        &db,
        renter,
        CreateReviewInput {
            rental_id: created.id,
            rating: 4,
            comment: None,
        },
    )
    .await
    .expect("review failed");
    let err = review_service::create_review(
        &db,
        renter,
        CreateReviewInput {
            rental_id: created.id,
            rating: 4,
            comment: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        clothshare::services::review_service::ServiceError::InvalidState(_)
    ));
}
