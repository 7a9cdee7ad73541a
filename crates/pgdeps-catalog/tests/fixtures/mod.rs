//! Test fixtures for catalog adapter integration tests
//!
//! A small order-management schema with the shapes the resolver cares
//! about: tables, views over them, functions calling views, and foreign
//! keys including a composite one.

use pgdeps_catalog::MockCatalog;

/// Schema all fixtures live in
pub const SHOP: &str = "shop";

/// Order-management catalog
///
/// - tables `customers`, `orders`, `order_lines`, `products`
/// - `order_lines` references `orders` on `(order_id, order_rev)`
/// - `orders` references `customers` on `customer_id`
/// - view `open_orders` over `orders`, view `order_totals` over
///   `open_orders` and `order_lines`
/// - function `close_order` updating `orders`, function `monthly_report`
///   reading `order_totals`
pub fn shop_catalog() -> MockCatalog {
    MockCatalog::builder()
        .with_table(SHOP, "customers")
        .with_table(SHOP, "orders")
        .with_table(SHOP, "order_lines")
        .with_table(SHOP, "products")
        .with_view(
            SHOP,
            "open_orders",
            " SELECT o.id, o.customer_id FROM shop.orders o WHERE o.closed_at IS NULL;",
        )
        .with_view(
            SHOP,
            "order_totals",
            " SELECT oo.id, sum(l.amount) AS total\n   FROM shop.open_orders oo\n     JOIN shop.order_lines l ON l.order_id = oo.id\n  GROUP BY oo.id;",
        )
        .with_function(
            SHOP,
            "close_order",
            "CREATE OR REPLACE FUNCTION shop.close_order(p_id integer)\n RETURNS void\n LANGUAGE sql\nAS $function$ UPDATE shop.orders SET closed_at = now() WHERE id = p_id $function$\n",
        )
        .with_function(
            SHOP,
            "monthly_report",
            "CREATE OR REPLACE FUNCTION shop.monthly_report()\n RETURNS SETOF shop.order_totals\n LANGUAGE sql\nAS $function$ SELECT * FROM order_totals $function$\n",
        )
        .with_foreign_key(SHOP, "orders", SHOP, "order_lines", ["order_id", "order_rev"])
        .with_foreign_key(SHOP, "customers", SHOP, "orders", ["customer_id"])
        .build()
}

/// Objects living in reserved namespaces and the reserved function name
pub fn reserved_catalog() -> MockCatalog {
    MockCatalog::builder()
        .with_table(SHOP, "orders")
        .with_view("public", "orders_copy", " SELECT * FROM shop.orders;")
        .with_view("pg_catalog", "pg_orders", " SELECT * FROM shop.orders;")
        .with_function(SHOP, "nmul", "SELECT count(*) FROM shop.orders")
        .with_function(SHOP, "count_orders", "SELECT count(*) FROM shop.orders")
        .build()
}
