use sea_orm::*;

use crate::auth::hash_password;
use crate::models::{item, user};

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = chrono::Utc::now().to_rfc3339();

    // 1. Create Users
    let maya_password = hash_password("maya123").unwrap();
    let arjun_password = hash_password("arjun123").unwrap();

    let maya = user::ActiveModel {
        name: Set("Maya Sharma".to_owned()),
        email: Set("maya@example.com".to_owned()),
        password_hash: Set(maya_password),
        campus: Set(Some("North Campus".to_owned())),
        building: Set(Some("Block C".to_owned())),
        rating: Set(0.0),
        review_count: Set(0),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };

    let arjun = user::ActiveModel {
        name: Set("Arjun Patel".to_owned()),
        email: Set("arjun@example.com".to_owned()),
        password_hash: Set(arjun_password),
        campus: Set(Some("North Campus".to_owned())),
        building: Set(Some("Block A".to_owned())),
        rating: Set(0.0),
        review_count: Set(0),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };

    for account in [maya, arjun] {
        let res = user::Entity::insert(account)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(user::Column::Email)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(db)
            .await;
        match res {
            // Already seeded
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    // 2. Create Items (only on first run)
    let existing_items = item::Entity::find().count(db).await?;
    if existing_items > 0 {
        return Ok(());
    }

    let listings = vec![
        (
            1,
            "Red Silk Lehenga with Gold Embroidery",
            "traditional",
            "Lehenga",
            "M",
            450.0,
            2000.0,
            15,
        ),
        (
            1,
            "Pearl Jewelry Set - Necklace & Earrings",
            "accessories",
            "Jewelry",
            "Free Size",
            150.0,
            1000.0,
            0,
        ),
        (
            2,
            "Navy Blue Blazer - Formal",
            "western",
            "Blazer",
            "L",
            250.0,
            800.0,
            10,
        ),
        (
            2,
            "Black Cocktail Dress",
            "western",
            "Dress",
            "S",
            300.0,
            1200.0,
            20,
        ),
    ];

    for (user_id, title, category, subcategory, size, price, deposit, discount) in listings {
        let listing = item::ActiveModel {
            user_id: Set(user_id),
            title: Set(title.to_owned()),
            category: Set(Some(category.to_owned())),
            subcategory: Set(Some(subcategory.to_owned())),
            size: Set(Some(size.to_owned())),
            daily_price: Set(price),
            security_deposit: Set(deposit),
            weekly_discount: Set(discount),
            images: Set("[]".to_owned()),
            status: Set("available".to_owned()),
            view_count: Set(0),
            save_count: Set(0),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        item::Entity::insert(listing).exec(db).await?;
    }

    Ok(())
}
