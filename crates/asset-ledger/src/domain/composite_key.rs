//! # Composite Keys
//!
//! Multi-attribute keys for secondary indexes.
//!
//! Encoding: `U+0000 objectType U+0000 attr1 U+0000 attr2 U+0000 ...`
//!
//! Record keys may not contain U+0000, so the composite namespace never
//! collides with record keys and a range scan over records never sees index
//! entries.

use thiserror::Error;

/// Separator and namespace marker for composite keys.
pub const COMPOSITE_KEY_NAMESPACE: char = '\u{0000}';

/// Object type of the owner index.
pub const OWNER_INDEX: &str = "owner~id";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositeKeyError {
    #[error("object type must not be empty")]
    EmptyObjectType,

    #[error("composite key component contains U+0000: {0:?}")]
    EmbeddedSeparator(String),

    #[error("not a composite key: {0:?}")]
    NotComposite(String),
}

fn check_component(component: &str) -> Result<(), CompositeKeyError> {
    if component.contains(COMPOSITE_KEY_NAMESPACE) {
        return Err(CompositeKeyError::EmbeddedSeparator(component.to_string()));
    }
    Ok(())
}

/// Build a composite key from an object type and attributes.
///
/// With fewer attributes than the index defines, the result is a partial key
/// usable as a scan prefix.
pub fn create_composite_key(
    object_type: &str,
    attributes: &[&str],
) -> Result<String, CompositeKeyError> {
    if object_type.is_empty() {
        return Err(CompositeKeyError::EmptyObjectType);
    }
    check_component(object_type)?;

    let mut key = String::with_capacity(
        2 + object_type.len() + attributes.iter().map(|a| a.len() + 1).sum::<usize>(),
    );
    key.push(COMPOSITE_KEY_NAMESPACE);
    key.push_str(object_type);
    key.push(COMPOSITE_KEY_NAMESPACE);
    for attribute in attributes {
        check_component(attribute)?;
        key.push_str(attribute);
        key.push(COMPOSITE_KEY_NAMESPACE);
    }
    Ok(key)
}

/// Split a composite key into its object type and attributes.
pub fn split_composite_key(key: &str) -> Result<(String, Vec<String>), CompositeKeyError> {
    let body = key
        .strip_prefix(COMPOSITE_KEY_NAMESPACE)
        .and_then(|rest| rest.strip_suffix(COMPOSITE_KEY_NAMESPACE))
        .ok_or_else(|| CompositeKeyError::NotComposite(key.to_string()))?;

    let mut parts = body.split(COMPOSITE_KEY_NAMESPACE).map(str::to_string);
    let object_type = parts
        .next()
        .filter(|t| !t.is_empty())
        .ok_or(CompositeKeyError::EmptyObjectType)?;
    Ok((object_type, parts.collect()))
}

/// Owner index entry for one asset.
pub fn owner_index_key(owner: &str, asset_id: &str) -> Result<String, CompositeKeyError> {
    create_composite_key(OWNER_INDEX, &[owner, asset_id])
}

/// Scan prefix covering every asset of `owner`.
pub fn owner_index_prefix(owner: &str) -> Result<String, CompositeKeyError> {
    create_composite_key(OWNER_INDEX, &[owner])
}
