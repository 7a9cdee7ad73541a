//! Catalog fixtures for engine integration tests

use pgdeps_catalog::MockCatalog;

/// Table `s.t`, view `s.v` over it, table `s.u` with a foreign key to `t`
pub fn minimal_schema() -> MockCatalog {
    MockCatalog::builder()
        .with_table("s", "t")
        .with_view("s", "v", "SELECT * FROM s.t")
        .with_table("s", "u")
        .with_foreign_key("s", "t", "s", "u", ["id"])
        .build()
}

/// Views `s.a` and `s.b` referencing each other
pub fn cyclic_views() -> MockCatalog {
    MockCatalog::builder()
        .with_view("s", "a", " SELECT id FROM s.b")
        .with_view("s", "b", " SELECT id FROM s.a")
        .build()
}

/// Layered warehouse schema
///
/// ```text
/// sales.orders ──► sales.order_summary ──► sales.refresh_summary()
///      │                    │
///      │                    └──► reporting.daily_revenue
///      ├──► sales.place_order()
///      └─fk─ sales.order_lines (order_id, order_rev)
///      └─fk─ sales.refunds (order_id)
/// ```
///
/// `reporting.unrelated` mentions `orders` without qualification, which
/// only resolves within `sales`, so it is not a dependent.
pub fn warehouse() -> MockCatalog {
    MockCatalog::builder()
        .with_table("sales", "orders")
        .with_table("sales", "order_lines")
        .with_table("sales", "refunds")
        .with_view(
            "sales",
            "order_summary",
            " SELECT o.id,\n    o.total\n   FROM orders o\n  WHERE o.total > 0::numeric;",
        )
        .with_function(
            "sales",
            "place_order",
            "CREATE OR REPLACE FUNCTION sales.place_order(p_total numeric)\n RETURNS integer\n LANGUAGE plpgsql\nAS $function$\nBEGIN\n  INSERT INTO sales.orders(total) VALUES (p_total);\n  RETURN 1;\nEND\n$function$\n",
        )
        .with_function(
            "sales",
            "refresh_summary",
            "CREATE OR REPLACE FUNCTION sales.refresh_summary()\n RETURNS bigint\n LANGUAGE sql\nAS $function$ SELECT count(*) FROM sales.order_summary $function$\n",
        )
        .with_view(
            "reporting",
            "daily_revenue",
            " SELECT sum(s.total) AS revenue\n   FROM sales.order_summary s;",
        )
        .with_view("reporting", "unrelated", " SELECT count(*) AS n\n   FROM orders;")
        .with_foreign_key("sales", "orders", "sales", "refunds", ["order_id"])
        .with_foreign_key("sales", "orders", "sales", "order_lines", ["order_id", "order_rev"])
        .build()
}
