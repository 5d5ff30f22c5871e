//! Index maintenance across two actors.
//!
//! An entity write and the matching index write are two independent actor
//! commits. Updates therefore run as a two-step saga: the entity actor saves
//! its new snapshot first, then applies an [`IndexTransition`] to the index.
//! If step 2 fails the entity is already saved and the index lags behind
//! until the operation is retried or the entity is reindexed. Every step is
//! idempotent, so both repairs are safe.

use crate::domain::non_blank;

/// Index entry changes needed when an indexed value goes from `old` to `new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTransition {
    pub remove: Option<String>,
    pub add: Option<String>,
}

impl IndexTransition {
    /// Returns `None` when the value did not change.
    ///
    /// Blank values are never indexed, so they produce neither a removal nor
    /// an addition.
    pub fn between(old: Option<&str>, new: Option<&str>) -> Option<Self> {
        if old == new {
            return None;
        }
        let transition = Self {
            remove: non_blank(old).map(str::to_string),
            add: non_blank(new).map(str::to_string),
        };
        if transition.remove.is_none() && transition.add.is_none() {
            return None;
        }
        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_value_needs_nothing() {
        assert_eq!(IndexTransition::between(Some("A@X.COM"), Some("A@X.COM")), None);
        assert_eq!(IndexTransition::between(None, None), None);
        assert_eq!(IndexTransition::between(Some(" "), None), None);
    }

    #[test]
    fn test_rename_removes_old_and_adds_new() {
        let transition = IndexTransition::between(Some("A@X.COM"), Some("B@X.COM")).unwrap();
        assert_eq!(transition.remove.as_deref(), Some("A@X.COM"));
        assert_eq!(transition.add.as_deref(), Some("B@X.COM"));
    }

    #[test]
    fn test_clearing_only_removes() {
        let transition = IndexTransition::between(Some("A@X.COM"), Some("")).unwrap();
        assert_eq!(transition.remove.as_deref(), Some("A@X.COM"));
        assert_eq!(transition.add, None);

        let transition = IndexTransition::between(None, Some("B@X.COM")).unwrap();
        assert_eq!(transition.remove, None);
        assert_eq!(transition.add.as_deref(), Some("B@X.COM"));
    }
}
