//! # antnet-types::name
//!
//! Hierarchical content names. A name is a `/`-separated path such as
//! `Trondheim/video/03`; forwarding tables are keyed by names, and the
//! forwarding engine falls back to shorter and shorter prefixes of a
//! requested name when no exact entry exists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A hierarchical, `/`-separated content name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name with its last component stripped, or `None` for a
    /// single-component name.
    pub fn parent(&self) -> Option<Name> {
        self.0.rfind('/').map(|i| Name(self.0[..i].to_string()))
    }

    /// Walks from the full name down to its first component by stripping
    /// one `/`-separated suffix at a time: `a/b/c`, `a/b`, `a`.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        std::iter::successors(Some(self.0.as_str()), |cur| {
            cur.rfind('/').map(|i| &cur[..i])
        })
    }

    /// Whether `prefix` is this name or a whole-component prefix of it.
    /// `a/b` is prefixed by `a` and `a/b` but not by `a/` or `a/bc`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        match self.0.strip_prefix(prefix) {
            Some("") => true,
            Some(rest) => rest.starts_with('/'),
            None => false,
        }
    }

    /// Appends one component, yielding `self/component`.
    pub fn child(&self, component: &str) -> Name {
        Name(format!("{}/{}", self.0, component))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name(s.to_string())
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestors_strip_suffixes() {
        let n = Name::new("Trondheim/video/03");
        let walk: Vec<&str> = n.ancestors().collect();
        assert_eq!(walk, vec!["Trondheim/video/03", "Trondheim/video", "Trondheim"]);
    }

    #[test]
    fn prefix_respects_component_boundaries() {
        let n = Name::new("Trondheim/video");
        assert!(n.has_prefix("Trondheim"));
        assert!(n.has_prefix("Trondheim/video"));
        assert!(!n.has_prefix("Trond"));
        assert!(!n.has_prefix("Trondheim/video/03"));
    }

    #[test]
    fn parent_and_child() {
        let n = Name::new("a/b");
        assert_eq!(n.parent(), Some(Name::new("a")));
        assert_eq!(Name::new("a").parent(), None);
        assert_eq!(n.child("c"), Name::new("a/b/c"));
    }
}
