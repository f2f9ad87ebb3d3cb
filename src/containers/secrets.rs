//! Patch computation for write-only secret environment variables.
//!
//! The API never returns secret material: reads echo an irreversibly
//! hashed value per key. An update must therefore submit only the entries
//! the user actually changed, and must never feed a hashed display
//! artifact back to the API as if it were a real secret.

use std::collections::BTreeMap;

use super::types::{Secret, SecretHashedValue};

/// Prefix identifying values the API already hashed.
pub const HASHED_SECRET_PREFIX: &str = "$argon2id";

/// Computes the minimal secret mutation list for an update.
///
/// Every entry of `new` whose value is not yet hashed is submitted as a
/// create/update; every key of `old` absent from `new` is submitted with
/// an absent value, which the API treats as a deletion.
#[must_use]
pub fn filter_secret_patch(
    old: &BTreeMap<String, String>,
    new: &BTreeMap<String, String>,
) -> Vec<Secret> {
    let mut patch = Vec::new();

    for (key, value) in new {
        if value.starts_with(HASHED_SECRET_PREFIX) {
            continue;
        }
        patch.push(Secret {
            key: key.clone(),
            value: Some(value.clone()),
        });
    }

    for key in old.keys() {
        if !new.contains_key(key) {
            patch.push(Secret {
                key: key.clone(),
                value: None,
            });
        }
    }

    patch
}

/// Expands a declared secret map into the API's creation list.
#[must_use]
pub fn expand_secrets(declared: &BTreeMap<String, String>) -> Vec<Secret> {
    declared
        .iter()
        .map(|(key, value)| Secret {
            key: key.clone(),
            value: Some(value.clone()),
        })
        .collect()
}

/// Flattens the hashed secrets of an API response into the recorded map.
#[must_use]
pub fn flatten_hashed_secrets(secrets: &[SecretHashedValue]) -> BTreeMap<String, String> {
    secrets
        .iter()
        .map(|secret| (secret.key.clone(), secret.hashed_value.clone()))
        .collect()
}
