//! Whole-schema summary

use pgdeps_catalog::CatalogAdapter;
use pgdeps_core::{SchemaReport, SummaryRow};
use crate::error::ResolveError;
use crate::resolver::children_in;

/// Count one-hop dependents and foreign keys for every table and view of
/// `schema`
///
/// Definitions are fetched once and shared by every row.
pub async fn summarize_schema(
    catalog: &dyn CatalogAdapter,
    schema: &str,
) -> Result<SchemaReport, ResolveError> {
    let objects = catalog.list_objects(schema).await?;
    let definitions = catalog.fetch_definitions().await?;

    tracing::info!(
        schema,
        objects = objects.len(),
        definitions = definitions.len(),
        "summarizing schema"
    );

    let mut rows = Vec::with_capacity(objects.len());
    for object in &objects {
        let links = children_in(&definitions, object)?.len();
        let foreign_keys = catalog.foreign_keys_to(object).await?.len();
        rows.push(SummaryRow::new(object, links, foreign_keys));
    }

    Ok(SchemaReport::new(schema, rows))
}
