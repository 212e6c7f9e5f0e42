//! OpenSearch index settings and mapping rendering.
//!
//! Field roles translate to OpenSearch types as follows:
//! - **Stored**: `text` with `index: false`, returned but never searched and
//!   free of the keyword length limit
//! - **Exact**: `keyword`, for facets and exact filters
//! - **FullText**: `text`, analyzed for partial matches
//! - **Float** / **Integer**: numeric types

use serde_json::{json, Map, Value};

use crate::mapping::{FieldRole, Mapping};

/// Get the settings used when creating the index.
///
/// The index is created without field mappings; those are submitted
/// separately the first time the indexer runs against it.
pub fn get_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        }
    })
}

/// OpenSearch options for a single field role.
pub fn field_options(role: FieldRole) -> Value {
    match role {
        FieldRole::Stored => json!({ "type": "text", "index": false }),
        FieldRole::Exact => json!({ "type": "keyword" }),
        FieldRole::FullText => json!({ "type": "text" }),
        FieldRole::Float => json!({ "type": "float" }),
        FieldRole::Integer => json!({ "type": "integer" }),
    }
}

/// Render a mapping as a put-mapping request body.
///
/// The mapping name is stored under `_meta.mapping_name` so that
/// [`has_named_mapping`] can tell a provisioned index from a bare one.
pub fn get_mapping_body(mapping: &Mapping) -> Value {
    let properties: Map<String, Value> = mapping
        .fields()
        .map(|(name, role)| (name.to_string(), field_options(role)))
        .collect();

    json!({
        "_meta": { "mapping_name": mapping.name() },
        "properties": properties
    })
}

/// Whether a get-mapping response contains a mapping with the given name.
///
/// The response is keyed by concrete index name, which differs from the
/// requested name when an alias is used, so every entry is inspected.
pub fn has_named_mapping(response: &Value, mapping_name: &str) -> bool {
    response
        .as_object()
        .map(|indices| {
            indices.values().any(|index| {
                index["mappings"]["_meta"]["mapping_name"].as_str() == Some(mapping_name)
            })
        })
        .unwrap_or(false)
}
