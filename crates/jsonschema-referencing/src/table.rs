use ahash::AHashMap;
use url::Url;

use crate::{uri, AnchorKey, AnchorKind, Error};

/// URI table mapping canonical resource URIs and anchors to resolution targets.
///
/// `T` is whatever handle the owner uses to address a compiled schema. The table only stores
/// handles; walking a JSON Pointer inside a resource is delegated to the caller, which owns the
/// actual documents.
#[derive(Debug, Clone)]
pub struct ResolutionTable<T> {
    resources: AHashMap<String, T>,
    anchors: AHashMap<AnchorKey, T>,
    dynamic_anchors: AHashMap<AnchorKey, T>,
}

impl<T> Default for ResolutionTable<T> {
    fn default() -> Self {
        Self {
            resources: AHashMap::new(),
            anchors: AHashMap::new(),
            dynamic_anchors: AHashMap::new(),
        }
    }
}

impl<T: Copy> ResolutionTable<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource under its canonical URI. Returns the previous target, if any.
    pub fn insert_resource(&mut self, uri: &Url, target: T) -> Option<T> {
        self.resources.insert(uri::without_fragment(uri), target)
    }

    /// Register an anchor declared by the resource identified by `base`.
    ///
    /// Dynamic anchors are also reachable as plain-name fragments.
    ///
    /// # Errors
    ///
    /// If the name is not a valid anchor, or the resource already declares it.
    pub fn insert_anchor(
        &mut self,
        base: &str,
        name: &str,
        kind: AnchorKind,
        target: T,
    ) -> Result<(), Error> {
        if !uri::is_valid_anchor(name) {
            return Err(Error::invalid_anchor(name));
        }
        let key = AnchorKey::new(base, name);
        if self.anchors.contains_key(&key) {
            return Err(Error::duplicate_anchor(base, name));
        }
        if kind == AnchorKind::Dynamic {
            self.dynamic_anchors.insert(key.clone(), target);
        }
        self.anchors.insert(key, target);
        Ok(())
    }

    #[must_use]
    pub fn resource(&self, key: &str) -> Option<T> {
        self.resources.get(key).copied()
    }

    #[must_use]
    pub fn contains_resource(&self, key: &str) -> bool {
        self.resources.contains_key(key)
    }

    #[must_use]
    pub fn anchor(&self, base: &str, name: &str, kind: AnchorKind) -> Option<T> {
        let key = AnchorKey::new(base, name);
        match kind {
            AnchorKind::Static => self.anchors.get(&key).copied(),
            AnchorKind::Dynamic => self.dynamic_anchors.get(&key).copied(),
        }
    }

    /// Canonical URIs of all registered resources.
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Resolve an absolute URI to a target.
    ///
    /// An empty fragment addresses the resource itself, a fragment starting with `/` is a JSON
    /// Pointer walked by `follow`, anything else is an anchor name.
    ///
    /// # Errors
    ///
    /// If the resource is not registered, the pointer leads nowhere, or the anchor is unknown.
    pub fn lookup<F>(&self, uri: &Url, follow: F) -> Result<T, Error>
    where
        F: FnOnce(T, &str) -> Option<T>,
    {
        let (key, fragment) = uri::split_fragment(uri)?;
        let Some(resource) = self.resource(&key) else {
            return Err(Error::unresolvable(key));
        };
        match fragment {
            None => Ok(resource),
            Some(pointer) if pointer.starts_with('/') => {
                follow(resource, &pointer).ok_or_else(|| Error::pointer_to_nowhere(pointer))
            }
            Some(name) => {
                if !uri::is_valid_anchor(&name) {
                    return Err(Error::invalid_anchor(name));
                }
                self.anchor(&key, &name, AnchorKind::Static)
                    .ok_or_else(|| Error::no_such_anchor(name))
            }
        }
    }

    /// Move every entry of `other` into `self`. Entries already present are kept.
    pub fn extend(&mut self, other: ResolutionTable<T>) {
        for (key, target) in other.resources {
            self.resources.entry(key).or_insert(target);
        }
        for (key, target) in other.anchors {
            self.anchors.entry(key).or_insert(target);
        }
        for (key, target) in other.dynamic_anchors {
            self.dynamic_anchors.entry(key).or_insert(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn table() -> ResolutionTable<u32> {
        let mut table = ResolutionTable::new();
        let root = uri::from_str("http://example.com/root.json").expect("Valid URI");
        table.insert_resource(&root, 0);
        table
            .insert_anchor("http://example.com/root.json", "item", AnchorKind::Static, 7)
            .expect("Valid anchor");
        table
            .insert_anchor("http://example.com/root.json", "node", AnchorKind::Dynamic, 9)
            .expect("Valid anchor");
        table
    }

    fn follow(_: u32, pointer: &str) -> Option<u32> {
        (pointer == "/$defs/a").then_some(3)
    }

    #[test_case("http://example.com/root.json", 0)]
    #[test_case("http://example.com/root.json#", 0)]
    #[test_case("http://example.com/root.json#item", 7)]
    #[test_case("http://example.com/root.json#node", 9)]
    #[test_case("http://example.com/root.json#/$defs/a", 3)]
    fn lookups(target: &str, expected: u32) {
        let table = table();
        let target = uri::from_str(target).expect("Valid URI");
        assert_eq!(table.lookup(&target, follow).expect("Resolvable"), expected);
    }

    #[test_case("http://example.com/other.json", "Resource 'http://example.com/other.json' is not present in a registry")]
    #[test_case("http://example.com/root.json#missing", "Anchor 'missing' does not exist")]
    #[test_case("http://example.com/root.json#/$defs/b", "Pointer '/$defs/b' does not exist")]
    #[test_case("http://example.com/root.json#1bad", "Anchor '1bad' is invalid")]
    fn failures(target: &str, message: &str) {
        let table = table();
        let target = uri::from_str(target).expect("Valid URI");
        let error = table.lookup(&target, follow).expect_err("Should fail");
        assert_eq!(error.to_string(), message);
    }

    #[test]
    fn dynamic_anchor_lookup_is_separate() {
        let table = table();
        let base = "http://example.com/root.json";
        assert_eq!(table.anchor(base, "node", AnchorKind::Dynamic), Some(9));
        assert_eq!(table.anchor(base, "item", AnchorKind::Dynamic), None);
    }

    #[test]
    fn duplicate_anchor() {
        let mut table = table();
        let error = table
            .insert_anchor("http://example.com/root.json", "item", AnchorKind::Dynamic, 1)
            .expect_err("Should fail");
        assert_eq!(
            error.to_string(),
            "Anchor 'item' is declared more than once in 'http://example.com/root.json'"
        );
    }

    #[test]
    fn extend_keeps_existing() {
        let mut table = table();
        let mut other = ResolutionTable::new();
        let root = uri::from_str("http://example.com/root.json").expect("Valid URI");
        let second = uri::from_str("http://example.com/second.json").expect("Valid URI");
        other.insert_resource(&root, 42);
        other.insert_resource(&second, 5);
        table.extend(other);
        assert_eq!(table.resource("http://example.com/root.json"), Some(0));
        assert_eq!(table.resource("http://example.com/second.json"), Some(5));
    }
}
