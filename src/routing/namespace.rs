//! Namespace existence checks used during segmentation.
//!
//! The router asks a [`NamespaceRegistry`] whether a chain of transformed
//! namespace identifiers (e.g. `["Admin", "Reports"]`) names a known
//! namespace. The controller registry answers from the names registered at
//! startup; [`NamespaceSet`] answers from configuration.

use std::collections::HashSet;

use crate::routing::naming;
use crate::routing::route_data::QUALIFIED_SEPARATOR;

/// Predicate deciding how many leading segments are namespaces.
pub trait NamespaceRegistry: Send + Sync {
    /// Returns true if `chain` (transformed identifiers, outermost first)
    /// is a known namespace.
    fn contains(&self, chain: &[String]) -> bool;
}

/// A fixed set of namespace chains.
#[derive(Debug, Clone, Default)]
pub struct NamespaceSet {
    chains: HashSet<String>,
}

impl NamespaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chain given as raw path segments, e.g. `"admin/user-tools"`.
    /// Every prefix of the chain becomes known as well.
    pub fn insert_path(&mut self, path: &str) {
        let mut chain = Vec::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            chain.push(naming::namespace_identifier(segment));
            self.chains.insert(chain.join(QUALIFIED_SEPARATOR));
        }
    }

    /// Register a chain of already transformed identifiers.
    pub fn insert_chain<S: AsRef<str>>(&mut self, chain: &[S]) {
        let mut joined = String::new();
        for (i, part) in chain.iter().enumerate() {
            if i > 0 {
                joined.push_str(QUALIFIED_SEPARATOR);
            }
            joined.push_str(part.as_ref());
            self.chains.insert(joined.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl NamespaceRegistry for NamespaceSet {
    fn contains(&self, chain: &[String]) -> bool {
        !chain.is_empty() && self.chains.contains(&chain.join(QUALIFIED_SEPARATOR))
    }
}

impl<F> NamespaceRegistry for F
where
    F: Fn(&[String]) -> bool + Send + Sync,
{
    fn contains(&self, chain: &[String]) -> bool {
        self(chain)
    }
}
