//! Explicit per-field change tracking for partial updates.
//!
//! The declarative engine knows which declared fields differ from the
//! recorded state. Update builders consult the flags carried here instead
//! of reflecting over a dynamic field map, so a request can never pick up a
//! field that was not explicitly changed.

/// A field value together with its has-changed status and, when the engine
/// recorded one, the previous value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Delta<T> {
    value: T,
    previous: Option<T>,
    changed: bool,
}

impl<T> Delta<T> {
    /// Marks the field as unchanged; builders will skip it.
    #[must_use]
    pub const fn unchanged(value: T) -> Self {
        Self {
            value,
            previous: None,
            changed: false,
        }
    }

    /// Marks the field as changed without a recorded prior value.
    #[must_use]
    pub const fn changed(value: T) -> Self {
        Self {
            value,
            previous: None,
            changed: true,
        }
    }

    /// Marks the field as changed from a recorded prior value.
    #[must_use]
    pub const fn changed_from(previous: T, value: T) -> Self {
        Self {
            value,
            previous: Some(previous),
            changed: true,
        }
    }

    /// Whether the engine reported this field as changed.
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        self.changed
    }

    /// The desired value, regardless of changed status.
    #[must_use]
    pub const fn get(&self) -> &T {
        &self.value
    }

    /// The desired value when changed, `None` otherwise.
    #[must_use]
    pub fn if_changed(&self) -> Option<&T> {
        self.changed.then_some(&self.value)
    }

    /// The previously recorded value, when the engine supplied one.
    #[must_use]
    pub fn previous(&self) -> Option<&T> {
        self.previous.as_ref()
    }

    /// Consumes the delta, yielding the desired value when changed.
    #[must_use]
    pub fn into_changed(self) -> Option<T> {
        self.changed.then_some(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_fields_yield_nothing() {
        let field = Delta::unchanged(42);
        assert!(!field.is_changed());
        assert_eq!(field.if_changed(), None);
        assert_eq!(field.into_changed(), None);
    }

    #[test]
    fn changed_fields_yield_the_new_value() {
        let field = Delta::changed(String::from("web"));
        assert!(field.is_changed());
        assert_eq!(field.if_changed().map(String::as_str), Some("web"));
        assert_eq!(field.into_changed().as_deref(), Some("web"));
    }

    #[test]
    fn changed_from_keeps_the_prior_value() {
        let field = Delta::changed_from(String::from("old"), String::from("new"));
        assert_eq!(field.previous().map(String::as_str), Some("old"));
        assert_eq!(field.get(), "new");
    }

    #[test]
    fn default_is_unchanged() {
        let field = Delta::<u32>::default();
        assert!(!field.is_changed());
        assert_eq!(*field.get(), 0);
    }
}
