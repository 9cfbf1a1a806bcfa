//! Live integration tests for kidshop-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/kidshop-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use chrono::{TimeZone, Utc};
use kidshop_core::{
    CourierSettings, DateRange, GeneralSettings, StatsFilter, VariantDescriptor,
};
use kidshop_db::{
    check_cart, create_category, create_product, dashboard_stats, get_general_settings,
    get_product, list_orders, list_products, mark_courier_status, mark_sent_to_courier,
    place_combo_order, place_order, save_courier_settings, save_general_settings,
    update_category, update_order_status, CartLine, ComboOrderLine, ComboOrderRequest, DbError,
    NewCategory, NewOrderLine, NewProduct, NewVariant, OrderError, OrderKind, OrderMetadata,
    OrderRequest, PlacementMode, ProductFilter, UpdateCategory,
};
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dec(s: &str) -> Decimal {
    s.parse().expect("decimal literal")
}

fn variant(color: &str, size: &str, sku: Option<&str>, stock: i32) -> NewVariant {
    NewVariant {
        design: "Dino".to_string(),
        color: color.to_string(),
        size: size.to_string(),
        sku: sku.map(ToOwned::to_owned),
        stock,
        price: None,
    }
}

async fn insert_test_product(
    pool: &sqlx::PgPool,
    name: &str,
    purchase_price: Option<&str>,
    variants: Vec<NewVariant>,
) -> i64 {
    create_product(
        pool,
        &NewProduct {
            name: name.to_string(),
            description: format!("{name} description"),
            category_ids: vec![1],
            price: dec("450.00"),
            offer_price: None,
            purchase_price: purchase_price.map(dec),
            design_name: Some("Dino".to_string()),
            image: "https://img.example/featured.jpg".to_string(),
            images: vec![],
            is_active: true,
            is_featured: false,
            variants,
        },
    )
    .await
    .unwrap_or_else(|e| panic!("insert_test_product failed for '{name}': {e}"))
}

fn attrs(color: &str, size: &str) -> VariantDescriptor {
    VariantDescriptor {
        sku: None,
        design: Some("Dino".to_string()),
        color: Some(color.to_string()),
        size: Some(size.to_string()),
    }
}

fn line(product_id: i64, descriptor: VariantDescriptor, quantity: i64, price: &str) -> NewOrderLine {
    NewOrderLine {
        product_ref: product_id.to_string(),
        descriptor,
        quantity,
        price: dec(price),
    }
}

fn checkout(items: Vec<NewOrderLine>) -> OrderRequest {
    OrderRequest {
        mode: PlacementMode::Checkout,
        customer_name: Some("Rina".to_string()),
        customer_email: Some("rina@example.com".to_string()),
        customer_phone: Some("01712345678".to_string()),
        address: None,
        note: None,
        items,
        metadata: OrderMetadata::default(),
    }
}

async fn variant_stock(pool: &sqlx::PgPool, product_id: i64, color: &str, size: &str) -> i32 {
    sqlx::query_scalar::<_, i32>(
        "SELECT stock FROM product_variants WHERE product_id = $1 AND color = $2 AND size = $3",
    )
    .bind(product_id)
    .bind(color)
    .bind(size)
    .fetch_one(pool)
    .await
    .expect("variant stock")
}

async fn count(pool: &sqlx::PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count")
}

// ---------------------------------------------------------------------------
// Section 1: Order placement
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn checkout_decrements_stock_and_records_daily_sales(pool: sqlx::PgPool) {
    let product_id = insert_test_product(
        &pool,
        "Dino Tee",
        Some("250.00"),
        vec![variant("Red", "M", None, 10), variant("Blue", "L", None, 4)],
    )
    .await;
    let now = Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap();

    let placed = place_order(
        &pool,
        &checkout(vec![
            line(product_id, attrs("Red", "M"), 2, "450.00"),
            line(product_id, attrs("Blue", "L"), 1, "500.00"),
        ]),
        now,
    )
    .await
    .expect("place_order failed");

    assert_eq!(placed.total_items, 3);
    assert_eq!(placed.total_price, dec("1400.00"));
    assert_eq!(placed.order_number, format!("ORD-{}", now.timestamp_millis()));
    assert_eq!(variant_stock(&pool, product_id, "Red", "M").await, 8);
    assert_eq!(variant_stock(&pool, product_id, "Blue", "L").await, 3);

    let (revenue, orders, items): (Decimal, i64, i64) = sqlx::query_as(
        "SELECT total_revenue, total_orders, total_items FROM daily_sales WHERE sale_date = $1",
    )
    .bind(now.date_naive())
    .fetch_one(&pool)
    .await
    .expect("daily_sales row");
    assert_eq!(revenue, dec("1400.00"));
    assert_eq!(orders, 1);
    assert_eq!(items, 3);

    let listing = list_orders(&pool, OrderKind::Product, None, None, None)
        .await
        .expect("list_orders failed");
    assert_eq!(listing.total, 1);
    assert_eq!(listing.orders[0].order.status, "pending");
    assert_eq!(listing.orders[0].order.payment_status, "unpaid");
    assert_eq!(listing.orders[0].items.len(), 2);
    assert_eq!(listing.orders[0].items[0].purchase_price, Some(dec("250.00")));
}

#[sqlx::test(migrations = "../../migrations")]
async fn insufficient_stock_leaves_database_untouched(pool: sqlx::PgPool) {
    let product_id =
        insert_test_product(&pool, "Dino Tee", None, vec![variant("Red", "M", None, 3)]).await;

    // Two lines for the same variant are summed before the stock check.
    let err = place_order(
        &pool,
        &checkout(vec![
            line(product_id, attrs("Red", "M"), 2, "450.00"),
            line(product_id, attrs("Red", "M"), 2, "450.00"),
        ]),
        Utc::now(),
    )
    .await
    .expect_err("oversell must fail");

    match err {
        OrderError::InsufficientStock {
            available,
            requested,
            ..
        } => {
            assert_eq!(available, 3);
            assert_eq!(requested, 4);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
    assert_eq!(variant_stock(&pool, product_id, "Red", "M").await, 3);
    assert_eq!(count(&pool, "orders").await, 0);
    assert_eq!(count(&pool, "order_items").await, 0);
    assert_eq!(count(&pool, "daily_sales").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn sub_cent_prices_are_stored_consistently(pool: sqlx::PgPool) {
    let product_id =
        insert_test_product(&pool, "Dino Tee", None, vec![variant("Red", "M", None, 10)]).await;

    let placed = place_order(
        &pool,
        &checkout(vec![line(product_id, attrs("Red", "M"), 3, "450.125")]),
        Utc::now(),
    )
    .await
    .expect("place_order failed");
    assert_eq!(placed.total_price, dec("1350.39"));

    let (stored_total, line_sum): (Decimal, Decimal) = sqlx::query_as(
        "SELECT o.total_price, SUM(i.price * i.quantity) \
         FROM orders o JOIN order_items i ON i.order_id = o.id \
         WHERE o.id = $1 GROUP BY o.total_price",
    )
    .bind(placed.id)
    .fetch_one(&pool)
    .await
    .expect("stored totals");
    assert_eq!(stored_total, placed.total_price);
    assert_eq!(line_sum, placed.total_price);
}

#[sqlx::test(migrations = "../../migrations")]
async fn oversized_quantity_is_a_validation_error(pool: sqlx::PgPool) {
    let product_id =
        insert_test_product(&pool, "Dino Tee", None, vec![variant("Red", "M", None, 10)]).await;

    let err = place_order(
        &pool,
        &checkout(vec![line(product_id, attrs("Red", "M"), i64::MAX, "450.00")]),
        Utc::now(),
    )
    .await
    .expect_err("oversized quantity must fail");
    assert!(matches!(err, OrderError::Validation(_)), "got {err:?}");
    assert_eq!(count(&pool, "orders").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn failed_write_rolls_back_every_step(pool: sqlx::PgPool) {
    let product_id =
        insert_test_product(&pool, "Dino Tee", None, vec![variant("Red", "M", None, 10)]).await;
    let now = Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap();

    // Occupy the order number this placement will generate.
    sqlx::query("INSERT INTO orders (order_number, customer_name) VALUES ($1, 'Earlier')")
        .bind(format!("ORD-{}", now.timestamp_millis()))
        .execute(&pool)
        .await
        .expect("seed order");

    let err = place_order(
        &pool,
        &checkout(vec![line(product_id, attrs("Red", "M"), 3, "450.00")]),
        now,
    )
    .await
    .expect_err("duplicate order number must fail");
    assert!(matches!(err, OrderError::Db(ref db) if db.is_unique_violation()));

    assert_eq!(variant_stock(&pool, product_id, "Red", "M").await, 10);
    assert_eq!(count(&pool, "orders").await, 1);
    assert_eq!(count(&pool, "order_items").await, 0);
    assert_eq!(count(&pool, "daily_sales").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn checkout_below_minimum_is_rejected(pool: sqlx::PgPool) {
    let product_id =
        insert_test_product(&pool, "Dino Tee", None, vec![variant("Red", "M", None, 10)]).await;

    let err = place_order(
        &pool,
        &checkout(vec![line(product_id, attrs("Red", "M"), 2, "450.00")]),
        Utc::now(),
    )
    .await
    .expect_err("two units is below the minimum");
    assert_eq!(
        err.to_string(),
        "Minimum order quantity is 3 items. Currently: 2"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn checkout_reports_unknown_references(pool: sqlx::PgPool) {
    let product_id =
        insert_test_product(&pool, "Dino Tee", None, vec![variant("Red", "M", None, 10)]).await;

    let mut request = checkout(vec![line(product_id, attrs("Red", "M"), 3, "450.00")]);
    request.items[0].product_ref = "not-an-id".to_string();
    let err = place_order(&pool, &request, Utc::now()).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidProductId(ref r) if r == "not-an-id"));

    let err = place_order(
        &pool,
        &checkout(vec![line(product_id + 1000, attrs("Red", "M"), 3, "450.00")]),
        Utc::now(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OrderError::ProductNotFound(_)));

    let err = place_order(
        &pool,
        &checkout(vec![line(product_id, attrs("Green", "S"), 3, "450.00")]),
        Utc::now(),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Variant not found for product Dino Tee (Design: Dino, Color: Green, Size: S)"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn direct_order_matches_sku_and_applies_metadata(pool: sqlx::PgPool) {
    let product_id = insert_test_product(
        &pool,
        "Dino Tee",
        None,
        vec![variant("Red", "M", Some("DINO-RED-M"), 5)],
    )
    .await;

    let request = OrderRequest {
        mode: PlacementMode::Direct,
        customer_name: Some("Karim".to_string()),
        customer_email: None,
        customer_phone: Some("01712345678".to_string()),
        address: Some("House 1, Road 2, Dhaka".to_string()),
        note: Some("Leave at gate".to_string()),
        items: vec![line(
            product_id,
            VariantDescriptor {
                sku: Some("DINO-RED-M".to_string()),
                ..VariantDescriptor::default()
            },
            1,
            "450.00",
        )],
        metadata: OrderMetadata {
            status: Some("confirmed".to_string()),
            payment_status: None,
            order_source: Some("facebook".to_string()),
        },
    };

    place_order(&pool, &request, Utc::now())
        .await
        .expect("direct order failed");

    assert_eq!(variant_stock(&pool, product_id, "Red", "M").await, 4);
    let listing = list_orders(&pool, OrderKind::Product, Some("confirmed"), None, None)
        .await
        .expect("list_orders failed");
    assert_eq!(listing.total, 1);
    assert_eq!(listing.orders[0].order.order_source, "facebook");
    assert_eq!(listing.orders[0].order.payment_status, "unpaid");
}

#[sqlx::test(migrations = "../../migrations")]
async fn combo_order_skips_stock_and_is_listed_separately(pool: sqlx::PgPool) {
    let product_id =
        insert_test_product(&pool, "Dino Tee", None, vec![variant("Red", "M", None, 5)]).await;

    let placed = place_combo_order(
        &pool,
        &ComboOrderRequest {
            customer_name: Some("Karim".to_string()),
            customer_email: None,
            customer_phone: Some("01712345678".to_string()),
            address: Some("Dhaka".to_string()),
            note: Some("Gift".to_string()),
            items: vec![ComboOrderLine {
                combo_id: None,
                name: "Summer Combo".to_string(),
                quantity: 2,
                price: dec("999.00"),
                size: Some("M".to_string()),
            }],
            metadata: OrderMetadata::default(),
        },
        Utc::now(),
    )
    .await
    .expect("combo order failed");

    assert_eq!(placed.total_price, dec("1998.00"));
    assert_eq!(variant_stock(&pool, product_id, "Red", "M").await, 5);

    let products = list_orders(&pool, OrderKind::Product, None, None, None)
        .await
        .expect("product listing");
    let combos = list_orders(&pool, OrderKind::Combo, None, None, None)
        .await
        .expect("combo listing");
    assert_eq!(products.total, 0);
    assert_eq!(combos.total, 1);
    assert_eq!(combos.orders[0].order.product_type, "combo");
}

#[sqlx::test(migrations = "../../migrations")]
async fn order_status_and_courier_write_back(pool: sqlx::PgPool) {
    let product_id =
        insert_test_product(&pool, "Dino Tee", None, vec![variant("Red", "M", None, 5)]).await;
    let placed = place_order(
        &pool,
        &checkout(vec![line(product_id, attrs("Red", "M"), 3, "450.00")]),
        Utc::now(),
    )
    .await
    .expect("place_order failed");

    let updated = update_order_status(&pool, placed.id, Some("shipped"), None)
        .await
        .expect("update_order_status failed");
    assert_eq!(updated.status, "shipped");
    assert_eq!(updated.payment_status, "unpaid");

    let missing = update_order_status(&pool, placed.id + 1, Some("x"), None).await;
    assert!(matches!(missing, Err(DbError::NotFound)));

    assert!(mark_sent_to_courier(&pool, &placed.order_number, "CN-1", Some("TRK-1"))
        .await
        .expect("mark_sent_to_courier failed"));
    assert!(!mark_sent_to_courier(&pool, "ORD-0", "CN-2", None)
        .await
        .expect("mark_sent_to_courier failed"));

    let touched = mark_courier_status(&pool, "CN-1", "delivered", Utc::now())
        .await
        .expect("mark_courier_status failed");
    assert_eq!(touched, 1);

    let listing = list_orders(&pool, OrderKind::Product, None, None, None)
        .await
        .expect("list_orders failed");
    let order = &listing.orders[0].order;
    assert_eq!(order.consignment_id.as_deref(), Some("CN-1"));
    assert_eq!(order.tracking_code.as_deref(), Some("TRK-1"));
    assert_eq!(order.courier_status.as_deref(), Some("delivered"));
    assert!(order.courier_last_checked.is_some());
}

// ---------------------------------------------------------------------------
// Section 2: Catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn product_listing_filters_and_attaches_variants(pool: sqlx::PgPool) {
    let tee = insert_test_product(&pool, "Dino Tee", None, vec![variant("Red", "M", None, 5)]).await;
    insert_test_product(&pool, "Rocket Shorts", None, vec![]).await;
    sqlx::query("UPDATE products SET is_active = FALSE WHERE name = 'Rocket Shorts'")
        .execute(&pool)
        .await
        .expect("deactivate");

    let all = list_products(&pool, &ProductFilter::default())
        .await
        .expect("list_products failed");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].variants.len(), 1);

    let searched = list_products(
        &pool,
        &ProductFilter {
            search: Some("dino".to_string()),
            ..ProductFilter::default()
        },
    )
    .await
    .expect("search failed");
    assert_eq!(searched.len(), 1);

    let by_category = list_products(
        &pool,
        &ProductFilter {
            category_id: Some(77),
            ..ProductFilter::default()
        },
    )
    .await
    .expect("category filter failed");
    assert!(by_category.is_empty());

    let fetched = get_product(&pool, tee).await.expect("get_product failed");
    assert_eq!(fetched.product.name, "Dino Tee");
    assert!(matches!(
        get_product(&pool, tee + 1000).await,
        Err(DbError::NotFound)
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn cart_check_collects_item_errors_without_aborting(pool: sqlx::PgPool) {
    let product_id =
        insert_test_product(&pool, "Dino Tee", None, vec![variant("Red", "M", None, 2)]).await;

    let report = check_cart(
        &pool,
        &[
            CartLine {
                product_ref: "bogus".to_string(),
                descriptor: attrs("Red", "M"),
                quantity: 1,
            },
            CartLine {
                product_ref: product_id.to_string(),
                descriptor: attrs("Red", "M"),
                quantity: 5,
            },
            CartLine {
                product_ref: product_id.to_string(),
                descriptor: attrs("Red", "M"),
                quantity: 1,
            },
        ],
    )
    .await
    .expect("check_cart failed");

    assert!(!report.is_valid);
    assert_eq!(report.items.len(), 2);
    assert!(!report.items[0].is_available);
    assert!(report.items[1].is_available);
    assert_eq!(report.errors[0], "Invalid product ID: bogus");
    assert_eq!(
        report.errors[1],
        "Insufficient stock for Dino Tee - Red M: Available 2, Requested 5"
    );
    assert_eq!(variant_stock(&pool, product_id, "Red", "M").await, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn cart_check_flags_non_positive_quantities(pool: sqlx::PgPool) {
    let product_id =
        insert_test_product(&pool, "Dino Tee", None, vec![variant("Red", "M", None, 2)]).await;
    let cart_line = |quantity| CartLine {
        product_ref: product_id.to_string(),
        descriptor: attrs("Red", "M"),
        quantity,
    };

    let report = check_cart(&pool, &[cart_line(0), cart_line(-3), cart_line(2)])
        .await
        .expect("check_cart failed");

    assert!(!report.is_valid);
    assert_eq!(report.items.len(), 3);
    assert!(!report.items[0].is_available);
    assert!(!report.items[1].is_available);
    assert!(report.items[2].is_available);
    assert_eq!(
        report.errors,
        vec![
            "Invalid quantity for Dino Tee: 0".to_string(),
            "Invalid quantity for Dino Tee: -3".to_string(),
        ]
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn category_slug_conflicts_and_cycles_are_rejected(pool: sqlx::PgPool) {
    let boys = create_category(
        &pool,
        &NewCategory {
            name: "Boys Wear".to_string(),
            is_active: true,
            ..NewCategory::default()
        },
    )
    .await
    .expect("create boys");
    assert_eq!(boys.slug, "boys-wear");

    let shirts = create_category(
        &pool,
        &NewCategory {
            name: "Shirts".to_string(),
            parent_id: Some(boys.id),
            is_active: true,
            ..NewCategory::default()
        },
    )
    .await
    .expect("create shirts");

    let dup = create_category(
        &pool,
        &NewCategory {
            name: "Boys  Wear".to_string(),
            is_active: true,
            ..NewCategory::default()
        },
    )
    .await
    .expect_err("duplicate slug");
    assert!(dup.is_unique_violation());

    let cycle = update_category(
        &pool,
        boys.id,
        &UpdateCategory {
            parent_id: Some(Some(shirts.id)),
            ..UpdateCategory::default()
        },
    )
    .await
    .expect_err("cycle");
    assert!(matches!(cycle, DbError::Core(_)));

    let renamed = update_category(
        &pool,
        shirts.id,
        &UpdateCategory {
            name: Some("Polo Shirts".to_string()),
            ..UpdateCategory::default()
        },
    )
    .await
    .expect("rename");
    assert_eq!(renamed.slug, "polo-shirts");
    assert_eq!(renamed.parent_id, Some(boys.id));
}

// ---------------------------------------------------------------------------
// Section 3: Statistics and settings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn stats_reproduce_hand_computed_revenue_and_profit(pool: sqlx::PgPool) {
    let tee = insert_test_product(&pool, "Dino Tee", Some("120.00"), vec![variant("Red", "M", None, 5)])
        .await;
    insert_test_product(&pool, "Rocket Shorts", None, vec![variant("Blue", "S", None, 40)]).await;

    let order_a: i64 = sqlx::query_scalar(
        "INSERT INTO orders (order_number, customer_name, total_price, total_items, status) \
         VALUES ('ORD-A', 'A', 1200, 3, 'Delivered') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .expect("order a");
    let order_b: i64 = sqlx::query_scalar(
        "INSERT INTO orders (order_number, customer_name, total_price, total_items, status, order_source) \
         VALUES ('ORD-B', 'B', 1000, 1, 'completed', 'facebook') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .expect("order b");
    sqlx::query(
        "INSERT INTO orders (order_number, customer_name, total_price, total_items) \
         VALUES ('ORD-C', 'C', 5000, 5)",
    )
    .execute(&pool)
    .await
    .expect("order c");

    // A: 2 × 500 at cost 300, 1 × 200 falling back to the product's 120.
    // B: 1 × 1000 at cost 600.
    for (order_id, product_id, qty, price, cost) in [
        (order_a, None, 2_i64, "500.00", Some("300.00")),
        (order_a, Some(tee), 1, "200.00", None),
        (order_b, None, 1, "1000.00", Some("600.00")),
    ] {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, product_name, quantity, price, purchase_price) \
             VALUES ($1, $2, 'line', $3, $4, $5)",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(qty)
        .bind(dec(price))
        .bind(cost.map(dec))
        .execute(&pool)
        .await
        .expect("order item");
    }

    let stats = dashboard_stats(&pool, DateRange::default())
        .await
        .expect("dashboard_stats failed");

    assert_eq!(stats.total_orders, 3);
    assert_eq!(stats.delivered_orders, 2);
    assert_eq!(stats.pending_orders, 1);
    assert_eq!(stats.total_revenue, dec("2200.00"));
    assert_eq!(stats.profit, dec("880.00"));
    assert_eq!(stats.total_products, 2);
    assert_eq!(stats.low_stock_items, 1);
    assert_eq!(stats.source_distribution.len(), 2);
    assert_eq!(stats.status_distribution.len(), 3);

    let future = StatsFilter::Month {
        month: 1,
        year: 2099,
    }
    .date_range(Utc::now())
    .expect("range");
    let empty = dashboard_stats(&pool, future).await.expect("filtered stats");
    assert_eq!(empty.total_orders, 0);
    assert_eq!(empty.total_revenue, Decimal::ZERO);
    assert_eq!(empty.total_products, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn settings_upserts_keep_a_single_row(pool: sqlx::PgPool) {
    let defaults = get_general_settings(&pool).await.expect("defaults");
    assert_eq!(defaults, GeneralSettings::default());

    let mut first = GeneralSettings::default();
    first.store_name = "First".to_string();
    save_general_settings(&pool, &first).await.expect("first save");

    let mut second = first.clone();
    second.store_name = "Second".to_string();
    save_general_settings(&pool, &second).await.expect("second save");

    assert_eq!(count(&pool, "general_settings").await, 1);
    let stored = get_general_settings(&pool).await.expect("stored");
    assert_eq!(stored.store_name, "Second");

    save_courier_settings(&pool, &CourierSettings::default())
        .await
        .expect("courier save");
    save_courier_settings(&pool, &CourierSettings::default())
        .await
        .expect("courier save again");
    assert_eq!(count(&pool, "courier_settings").await, 1);
}
