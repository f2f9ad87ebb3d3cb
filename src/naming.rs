//! Generated names for resources declared without one.

use uuid::Uuid;

/// Returns the declared name, or generates one from the prefix.
pub(crate) fn name_or_generated(name: Option<String>, prefix: &str) -> String {
    name.filter(|value| !value.is_empty())
        .unwrap_or_else(|| format!("{prefix}-{}", Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_names_pass_through() {
        assert_eq!(
            name_or_generated(Some(String::from("web")), "co"),
            "web"
        );
    }

    #[test]
    fn omitted_and_empty_names_are_generated_with_the_prefix() {
        assert!(name_or_generated(None, "trigger").starts_with("trigger-"));
        assert!(name_or_generated(Some(String::new()), "co").starts_with("co-"));
    }
}
