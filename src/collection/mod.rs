use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::counts::{CollectionCounts, RawCounts};
use crate::filter::Filter;

/// One parsed page of a list response: the entities, the filter that
/// produced the request, and the pagination counts.
#[derive(Debug, Clone)]
pub struct Collection<E> {
    pub entities: Vec<E>,
    pub filter: Filter,
    pub counts: CollectionCounts,
}

/// Failure to decode a response envelope.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("response envelope is not a JSON object")]
    NotAnObject,
    #[error("failed to decode entity at index {index}: {source}")]
    Entity {
        index: usize,
        source: serde_json::Error,
    },
}

/// Parse a response envelope `{"entities": [...], "counts": {...}}` into a
/// typed collection page.
///
/// Counts are read leniently: missing fields are 0 and the `start`/`max`/
/// `page`/`total` aliases are honored. A missing entity array means an
/// empty page. Only an undecodable entity is an error.
pub fn parse_collection<E: DeserializeOwned>(
    raw: &serde_json::Value,
    filter: Filter,
) -> Result<Collection<E>, CollectionError> {
    let obj = raw.as_object().ok_or(CollectionError::NotAnObject)?;

    let mut entities = Vec::new();
    if let Some(items) = obj.get("entities").and_then(|v| v.as_array()) {
        for (index, item) in items.iter().enumerate() {
            let entity = serde_json::from_value(item.clone())
                .map_err(|source| CollectionError::Entity { index, source })?;
            entities.push(entity);
        }
    }

    let raw_counts = obj
        .get("counts")
        .map(|v| serde_json::from_value::<RawCounts>(v.clone()).unwrap_or_default())
        .unwrap_or_default();

    Ok(Collection {
        entities,
        filter,
        counts: CollectionCounts::new(raw_counts),
    })
}
