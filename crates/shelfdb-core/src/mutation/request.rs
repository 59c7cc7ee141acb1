//! Mutation wire parsing.
//!
//! A wire request interleaves field values with `#`-prefixed metadata in
//! one flat object, and the primary identifier may arrive either as
//! `#primary` or under the entity's own primary-key field name. Resolving
//! the latter needs the registry, so parsing happens here rather than as a
//! plain `Deserialize` impl.

use crate::catalog::Registry;
use crate::error::Error;
use serde::Deserialize;
use shelfdb_proto::{Guid, MutationBatch, MutationRequest, Value};

/// Parse one wire mutation object.
pub fn parse_request(raw: &serde_json::Value, registry: &Registry) -> Result<MutationRequest, Error> {
    let Some(object) = raw.as_object() else {
        return Err(Error::InvalidInputFormat(
            "mutation request must be an object".to_string(),
        ));
    };

    let Some(model_value) = object.get("#model") else {
        return Err(Error::MissingInputField("#model".to_string()));
    };
    let Some(model) = model_value.as_str() else {
        return Err(Error::InvalidInputField("#model".to_string()));
    };
    let entity = registry
        .lookup(model)
        .map_err(|_| Error::InvalidInputField("#model".to_string()))?;

    // `#primary` wins; the entity's own key field is the fallback.
    let guid_value = match object.get("#primary") {
        Some(value) => value,
        None => object
            .get(&entity.primary_key)
            .ok_or_else(|| Error::MissingInputField("#primary".to_string()))?,
    };
    let Some(guid_str) = guid_value.as_str() else {
        return Err(Error::InvalidInputField("#primary".to_string()));
    };
    let guid = Guid::parse(guid_str)?;

    let delete = object.contains_key("#delete");

    let mut request = MutationRequest::new(entity.name.clone(), guid);
    request.delete = delete;

    for (key, value) in object {
        if key.starts_with('#') {
            continue;
        }
        let value = Value::deserialize(value)
            .map_err(|_| Error::InvalidInputField(key.clone()))?;
        request.fields.insert(key.clone(), value);
    }

    Ok(request)
}

/// Parse a wire batch: a JSON array of mutation objects.
pub fn parse_batch(raw: &serde_json::Value, registry: &Registry) -> Result<MutationBatch, Error> {
    let Some(items) = raw.as_array() else {
        return Err(Error::InvalidInputFormat(
            "mutation batch must be an array".to_string(),
        ));
    };

    items
        .iter()
        .map(|item| parse_request(item, registry))
        .collect()
}
