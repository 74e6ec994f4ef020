//! Externals: modules the production bundle references but does not embed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mode::BuildMode;

/// Module name to the name the host runtime provides it under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalsSet(BTreeMap<String, String>);

impl ExternalsSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, module: &str) -> Option<&str> {
        self.0.get(module).map(String::as_str)
    }

    pub fn contains(&self, module: &str) -> bool {
        self.0.contains_key(module)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExternalsSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Compute the externals for `mode`.
///
/// Production maps every peer dependency to itself: the host environment
/// must supply each of those module names at load time. Development bundles
/// peer dependencies inline, so the set is always empty there.
pub fn resolve_externals(mode: BuildMode, peer_dependency_names: &BTreeSet<String>) -> ExternalsSet {
    match mode {
        BuildMode::Production => {
            let externals: ExternalsSet = peer_dependency_names
                .iter()
                .map(|name| (name.clone(), name.clone()))
                .collect();
            debug!(count = externals.len(), "peer dependencies externalised");
            externals
        }
        BuildMode::Development => ExternalsSet::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn production_maps_each_peer_to_itself() {
        let externals = resolve_externals(BuildMode::Production, &names(&["react"]));
        assert_eq!(externals.get("react"), Some("react"));
        assert_eq!(externals.len(), 1);
    }

    #[test]
    fn development_is_always_empty() {
        let externals = resolve_externals(BuildMode::Development, &names(&["react", "react-dom"]));
        assert!(externals.is_empty());
    }

    #[test]
    fn serializes_as_plain_object() {
        let externals = resolve_externals(BuildMode::Production, &names(&["react-dom", "react"]));
        assert_eq!(
            serde_json::to_string(&externals).unwrap(),
            r#"{"react":"react","react-dom":"react-dom"}"#
        );
    }
}
