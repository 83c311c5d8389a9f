#![allow(dead_code)]
use cm_common::{GeoPoint, Money};
use craft_market_engine::{
    db_types::{NewProduct, NewUser, Product, Role, User},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{ProductCatalog, ProfileManagement},
    SqliteDatabase,
};

/// A fresh, migrated, throwaway database for one test.
pub async fn new_test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

pub async fn seed_user(db: &SqliteDatabase, name: &str, role: Role, location: Option<GeoPoint>) -> User {
    let mut user = NewUser::new(name, role);
    if let Some(location) = location {
        user = user.with_location(location);
    }
    db.insert_user(user).await.expect("Error creating user")
}

pub async fn seed_product(db: &SqliteDatabase, artisan_id: i64, name: &str, price: i64) -> Product {
    db.insert_product(NewProduct::new(artisan_id, name, Money::from(price))).await.expect("Error creating product")
}
