//! Behavioural tests for the secret patch filter through the public API.

use std::collections::BTreeMap;

use nuage::containers::{HASHED_SECRET_PREFIX, filter_secret_patch};
use rstest::rstest;

fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

#[rstest]
#[case::untouched_hashed_state(
    map(&[("a", "$argon2id$v=19$aa"), ("b", "$argon2id$v=19$bb")]),
    map(&[("a", "$argon2id$v=19$aa"), ("b", "$argon2id$v=19$bb")])
)]
#[case::rotation(map(&[("a", "$argon2id$v=19$aa")]), map(&[("a", "rotated")]))]
#[case::addition_and_removal(
    map(&[("a", "$argon2id$v=19$aa")]),
    map(&[("b", "fresh"), ("c", "$argon2id$v=19$cc")])
)]
#[case::empty_maps(map(&[]), map(&[]))]
fn patch_never_resubmits_hashed_placeholders(
    #[case] old: BTreeMap<String, String>,
    #[case] new: BTreeMap<String, String>,
) {
    let patch = filter_secret_patch(&old, &new);
    for entry in &patch {
        if let Some(value) = entry.value.as_deref() {
            assert!(
                !value.starts_with(HASHED_SECRET_PREFIX),
                "hashed placeholder leaked for key {}",
                entry.key
            );
        }
    }
}

#[test]
fn patch_is_the_minimal_mutation_set() {
    let old = map(&[
        ("keep", "$argon2id$v=19$keep"),
        ("drop", "$argon2id$v=19$drop"),
    ]);
    let new = map(&[
        ("keep", "$argon2id$v=19$keep"),
        ("add", "plaintext"),
    ]);
    let patch = filter_secret_patch(&old, &new);

    let mut submitted: Vec<(&str, Option<&str>)> = patch
        .iter()
        .map(|entry| (entry.key.as_str(), entry.value.as_deref()))
        .collect();
    submitted.sort_unstable();
    assert_eq!(
        submitted,
        vec![("add", Some("plaintext")), ("drop", None)],
        "unchanged hashed entries must not appear in the patch"
    );
}
