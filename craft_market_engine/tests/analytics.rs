mod support;

use chrono::{Datelike, Utc};
use cm_common::{GeoPoint, Money};
use craft_market_engine::{
    db_types::{NewOrder, Role},
    AnalyticsApi,
    OrderFlowApi,
};
use support::{new_test_db, seed_product, seed_user};
use tokio::runtime::Runtime;

#[test]
fn rollups_tolerate_an_empty_shop() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let db = new_test_db().await;
        let artisan = seed_user(&db, "Asha", Role::Artisan, None).await;
        let api = AnalyticsApi::new(db.clone());

        let summary = api.dashboard(artisan.id).await.unwrap();
        assert!(summary.monthly_revenue.is_empty());
        assert!(summary.top_products.is_empty());
    });
}

#[test]
fn delivered_orders_roll_up_into_monthly_buckets() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let db = new_test_db().await;
        let buyer = seed_user(&db, "Bina", Role::Buyer, None).await;
        let artisan = seed_user(&db, "Asha", Role::Artisan, Some(GeoPoint::new(1.0, 1.0))).await;
        let rival = seed_user(&db, "Arlo", Role::Artisan, Some(GeoPoint::new(2.0, 2.0))).await;
        let honey = seed_product(&db, artisan.id, "Wild honey", 2_000).await;
        let cheese = seed_product(&db, artisan.id, "Goat cheese", 500).await;
        let rug = seed_product(&db, rival.id, "Rug", 10_000).await;
        let orders = OrderFlowApi::new(db.clone());
        let api = AnalyticsApi::new(db.clone());

        // Two delivered honey orders and one delivered cheese order for our artisan.
        for (product, qty) in [(&honey, 3), (&honey, 2), (&cheese, 10)] {
            let order = orders.create_order(NewOrder::new(product.id, buyer.id, qty)).await.unwrap();
            orders.approve_order(order.id, artisan.id).await.unwrap();
            orders.deliver_order(order.id, artisan.id).await.unwrap();
        }
        // Noise that must not count: a cancelled order, an open order, and a rival's delivery.
        let cancelled = orders.create_order(NewOrder::new(honey.id, buyer.id, 100)).await.unwrap();
        orders.cancel_order(cancelled.id, buyer.id, None).await.unwrap();
        orders.create_order(NewOrder::new(cheese.id, buyer.id, 50)).await.unwrap();
        let rivals = orders.create_order(NewOrder::new(rug.id, buyer.id, 1)).await.unwrap();
        orders.approve_order(rivals.id, rival.id).await.unwrap();
        orders.deliver_order(rivals.id, rival.id).await.unwrap();

        let buckets = api.monthly_revenue(artisan.id, 12).await.unwrap();
        assert_eq!(buckets.len(), 1, "everything happened this month");
        let now = Utc::now();
        assert_eq!(buckets[0].year, i64::from(now.year()));
        assert_eq!(buckets[0].month, i64::from(now.month()));
        // 3*2000 + 2*2000 + 10*500
        assert_eq!(buckets[0].revenue, Money::from(15_000));

        let top = api.top_products(artisan.id, 5).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Goat cheese");
        assert_eq!(top[0].total_quantity_sold, 10);
        assert_eq!(top[1].name, "Wild honey");
        assert_eq!(top[1].total_quantity_sold, 5);

        let top = api.top_products(artisan.id, 1).await.unwrap();
        assert_eq!(top.len(), 1, "the limit is honoured");
        assert_eq!(top[0].product_id, cheese.id);
    });
}

#[test]
fn the_revenue_window_trails_but_top_products_do_not() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let db = new_test_db().await;
        let buyer = seed_user(&db, "Bina", Role::Buyer, None).await;
        let artisan = seed_user(&db, "Asha", Role::Artisan, Some(GeoPoint::new(1.0, 1.0))).await;
        let product = seed_product(&db, artisan.id, "Olive oil", 3_000).await;
        let orders = OrderFlowApi::new(db.clone());
        let api = AnalyticsApi::new(db.clone());

        let old = orders.create_order(NewOrder::new(product.id, buyer.id, 2)).await.unwrap();
        orders.approve_order(old.id, artisan.id).await.unwrap();
        orders.deliver_order(old.id, artisan.id).await.unwrap();
        // Age the order past the reporting window.
        sqlx::query("UPDATE orders SET updated_at = datetime('now', '-2 years') WHERE id = $1")
            .bind(old.id)
            .execute(db.pool())
            .await
            .unwrap();

        let recent = orders.create_order(NewOrder::new(product.id, buyer.id, 1)).await.unwrap();
        orders.approve_order(recent.id, artisan.id).await.unwrap();
        orders.deliver_order(recent.id, artisan.id).await.unwrap();

        let buckets = api.monthly_revenue(artisan.id, 12).await.unwrap();
        assert_eq!(buckets.len(), 1, "the aged order fell out of the window");
        assert_eq!(buckets[0].revenue, Money::from(3_000));

        let top = api.top_products(artisan.id, 5).await.unwrap();
        assert_eq!(top[0].total_quantity_sold, 3, "top products have no time window");
    });
}
