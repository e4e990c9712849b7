//! Shared store of compiled documents.
//!
//! Compilation runs in phases over a staging area: documents are parsed and indexed, missing
//! documents are fetched through loaders, dialects are checked, patterns are compiled and only
//! then is the whole batch published. A failure at any phase leaves the registry untouched.
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use jsonschema_ir::JsonValue;
use parking_lot::{RwLock, RwLockReadGuard};
use referencing::{
    pointer::escape_segment, uri, AnchorKind, Error, ResolutionTable, Url,
};

use crate::{
    compiler::{self, Dialect},
    error::CompileError,
    node::{Document, DocumentId, Keywords, NodeId, Pattern, SchemaBody, SchemaRef},
    options::{Config, RegistryOptions},
    regex::{self, PatternEngine},
    resolver::{self, follow, Corpus},
    schema::Schema,
    scope::DynamicScope,
};

const DRAFT_202012: &str = "https://json-schema.org/draft/2020-12/schema";

pub(crate) type DefaultFunction = Arc<dyn Fn() -> JsonValue + Send + Sync>;

/// A thread-safe, append-only collection of compiled schema documents.
///
/// Cloning is cheap; clones share the same documents.
///
/// ```rust
/// use jsonschema::Registry;
/// use serde_json::json;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = Registry::new();
/// let schema = registry.compile(&json!({"type": "integer"}), None)?;
/// assert!(schema.is_valid(&json!(42)));
/// assert!(!schema.is_valid(&json!("42")));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RwLock<RegistryState>>,
}

pub(crate) struct RegistryState {
    documents: Vec<Arc<Document>>,
    table: ResolutionTable<SchemaRef>,
    /// References that did not resolve when their document was published.
    pending: AHashMap<DocumentId, Vec<Url>>,
    default_base: Url,
    anonymous: usize,
    pub(crate) config: Config,
    defaults: AHashMap<String, DefaultFunction>,
}

impl Corpus for RegistryState {
    fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(id.index()).map(|document| &**document)
    }

    fn lookup(&self, target: &Url) -> Result<SchemaRef, Error> {
        self.table
            .lookup(target, |resource, pointer| follow(self, resource, pointer))
    }

    fn dynamic_anchor(&self, base: &str, name: &str) -> Option<SchemaRef> {
        self.table.anchor(base, name, AnchorKind::Dynamic)
    }
}

impl RegistryState {
    fn new(config: Config, default_base: Url) -> RegistryState {
        RegistryState {
            documents: Vec::new(),
            table: ResolutionTable::new(),
            pending: AHashMap::new(),
            default_base,
            anonymous: 0,
            config,
            defaults: AHashMap::new(),
        }
    }

    fn compile(
        &mut self,
        inputs: Vec<(JsonValue, Option<String>)>,
    ) -> Result<Vec<SchemaRef>, CompileError> {
        let (roots, documents, table, anonymous) = {
            let mut staging = Staging::new(self);
            let mut roots = Vec::with_capacity(inputs.len());
            for (source, base) in inputs {
                roots.push(staging.stage(source, base.as_deref())?);
            }
            staging.load_missing()?;
            staging.check_dialects()?;
            staging.compile_patterns(&roots)?;
            (roots, staging.documents, staging.table, staging.anonymous)
        };
        self.anonymous = anonymous;
        self.publish(documents, table);
        Ok(roots)
    }

    fn publish(&mut self, documents: Vec<Document>, table: ResolutionTable<SchemaRef>) {
        let first = self.documents.len();
        self.table.extend(table);
        self.documents.extend(documents.into_iter().map(Arc::new));
        for document in &self.documents[first..] {
            tracing::debug!(
                uri = %document.uri,
                document = document.id.index(),
                nodes = document.nodes.len(),
                "Published schema document"
            );
        }
        // Earlier documents may now resolve against the new batch
        let mut pending = std::mem::take(&mut self.pending);
        pending.retain(|id, references| {
            references.retain(|reference| {
                let resolved = self.lookup(reference).is_ok();
                if resolved {
                    tracing::debug!(document = id.index(), reference = %reference, "Reference resolved");
                }
                !resolved
            });
            !references.is_empty()
        });
        for index in first..self.documents.len() {
            let id = DocumentId::new(index);
            let unresolved = self.unresolved_in(id);
            if !unresolved.is_empty() {
                for reference in &unresolved {
                    tracing::debug!(document = index, reference = %reference, "Reference is not resolvable yet");
                }
                pending.insert(id, unresolved);
            }
        }
        self.pending = pending;
    }

    fn unresolved_in(&self, id: DocumentId) -> Vec<Url> {
        let mut unresolved: Vec<Url> = Vec::new();
        let Some(document) = self.document(id) else {
            return unresolved;
        };
        for node in &document.nodes {
            let Some(keywords) = node.keywords() else {
                continue;
            };
            for reference in keywords.reference.iter().chain(&keywords.dynamic_reference) {
                if self.lookup(&reference.target).is_err() && !unresolved.contains(&reference.target)
                {
                    unresolved.push(reference.target.clone());
                }
            }
        }
        unresolved
    }

    /// Unresolved references of every document reachable from `root`.
    fn unresolved_from(&self, root: SchemaRef) -> Vec<String> {
        let mut seen = AHashSet::new();
        let mut stack = vec![root.document];
        let mut out = Vec::new();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(references) = self.pending.get(&id) {
                out.extend(references.iter().map(ToString::to_string));
            }
            let Some(document) = self.document(id) else {
                continue;
            };
            for node in &document.nodes {
                let Some(keywords) = node.keywords() else {
                    continue;
                };
                for reference in keywords.reference.iter().chain(&keywords.dynamic_reference) {
                    if let Ok(target) = self.lookup(&reference.target) {
                        stack.push(target.document);
                    }
                }
            }
        }
        out.sort();
        out.dedup();
        out
    }

    fn resolve_base(&self, from: SchemaRef) -> Result<Url, Error> {
        match self.node(from) {
            Some(node) => uri::from_str(&node.base),
            None => Ok(self.default_base.clone()),
        }
    }
}

/// Documents of one compilation batch, not yet visible to readers.
struct Staging<'s> {
    state: &'s RegistryState,
    /// Id of the first staged document.
    first: usize,
    documents: Vec<Document>,
    table: ResolutionTable<SchemaRef>,
    dialects: Vec<Dialect>,
    anonymous: usize,
}

impl Corpus for Staging<'_> {
    fn document(&self, id: DocumentId) -> Option<&Document> {
        match id.index().checked_sub(self.first) {
            Some(offset) => self.documents.get(offset),
            None => self.state.document(id),
        }
    }

    fn lookup(&self, target: &Url) -> Result<SchemaRef, Error> {
        match self
            .table
            .lookup(target, |resource, pointer| follow(self, resource, pointer))
        {
            Err(Error::Unresolvable { .. }) => self.state.lookup(target),
            other => other,
        }
    }

    fn dynamic_anchor(&self, base: &str, name: &str) -> Option<SchemaRef> {
        self.table
            .anchor(base, name, AnchorKind::Dynamic)
            .or_else(|| self.state.dynamic_anchor(base, name))
    }
}

impl<'s> Staging<'s> {
    fn new(state: &'s RegistryState) -> Staging<'s> {
        Staging {
            state,
            first: state.documents.len(),
            documents: Vec::new(),
            table: ResolutionTable::new(),
            dialects: Vec::new(),
            anonymous: state.anonymous,
        }
    }

    fn resource(&self, key: &str) -> Option<SchemaRef> {
        self.table
            .resource(key)
            .or_else(|| self.state.table.resource(key))
    }

    /// Parse one document and index its resources and anchors.
    fn stage(&mut self, source: JsonValue, hint: Option<&str>) -> Result<SchemaRef, CompileError> {
        let default_base = &self.state.default_base;
        let base = match hint {
            Some(hint) => uri::resolve_against(default_base, hint)?,
            None if source.get("$id").is_some() => default_base.clone(),
            None => {
                self.anonymous += 1;
                uri::resolve_against(default_base, &format!("anonymous-{}", self.anonymous))?
            }
        };
        let canonical = compiler::canonical_root(&source, &base)?;
        let key = uri::without_fragment(&canonical);
        if let Some(existing) = self.resource(&key) {
            let unchanged = existing.node == NodeId::ROOT
                && self
                    .document(existing.document)
                    .is_some_and(|document| document.source == source);
            if unchanged {
                tracing::debug!(uri = %key, "Schema is already compiled");
                return Ok(existing);
            }
            return Err(CompileError::duplicate_uri(key));
        }
        let id = DocumentId::new(self.first + self.documents.len());
        let parsed = compiler::parse(id, source, &canonical)?;
        for (resource, node) in &parsed.resources {
            let key = uri::without_fragment(resource);
            if self.resource(&key).is_some() {
                return Err(CompileError::duplicate_uri(key));
            }
            self.table.insert_resource(resource, SchemaRef::new(id, *node));
        }
        for anchor in &parsed.anchors {
            self.table.insert_anchor(
                &anchor.base,
                &anchor.name,
                anchor.kind,
                SchemaRef::new(id, anchor.node),
            )?;
        }
        self.dialects.extend(parsed.dialects);
        self.documents.push(parsed.document);
        tracing::debug!(uri = %canonical, document = id.index(), "Staged schema document");
        Ok(SchemaRef::root(id))
    }

    /// Fetch documents for references that nothing resolves, until no new ones appear.
    fn load_missing(&mut self) -> Result<(), CompileError> {
        if self.state.config.loaders.is_empty() {
            return Ok(());
        }
        let mut attempted = AHashSet::new();
        let mut scanned = 0;
        loop {
            let mut missing = Vec::new();
            for document in &self.documents[scanned..] {
                for node in &document.nodes {
                    let Some(keywords) = node.keywords() else {
                        continue;
                    };
                    for reference in keywords.reference.iter().chain(&keywords.dynamic_reference) {
                        let mut target = reference.target.clone();
                        target.set_fragment(None);
                        if self.resource(target.as_str()).is_none()
                            && self.state.config.loaders.contains_key(target.scheme())
                            && attempted.insert(target.to_string())
                        {
                            missing.push(target);
                        }
                    }
                }
            }
            scanned = self.documents.len();
            if missing.is_empty() {
                return Ok(());
            }
            for target in missing {
                let Some(loader) = self.state.config.loaders.get(target.scheme()) else {
                    continue;
                };
                tracing::debug!(uri = %target, "Loading external document");
                let bytes = loader.retrieve(&target).map_err(|error| {
                    CompileError::load(target.as_str(), Error::unretrievable(target.as_str(), error))
                })?;
                let source = self.state.config.codec.decode(&bytes).map_err(|error| {
                    CompileError::load(
                        target.as_str(),
                        Error::unretrievable(target.as_str(), Box::new(error)),
                    )
                })?;
                let root = self.stage(source, Some(target.as_str()))?;
                // A document with its own `$id` stays reachable by the URI it was loaded from
                if self.resource(target.as_str()).is_none() {
                    self.table.insert_resource(&target, root);
                }
            }
        }
    }

    fn check_dialects(&self) -> Result<(), CompileError> {
        for dialect in &self.dialects {
            let key = uri::without_fragment(&dialect.uri);
            if key != DRAFT_202012 && self.resource(&key).is_none() {
                return Err(CompileError::unsupported_dialect(
                    &dialect.location,
                    &dialect.raw,
                ));
            }
        }
        Ok(())
    }

    /// Compile every staged pattern. Patterns reachable from the roots are reported with the
    /// evaluation path that reaches them; the rest with their lexical location.
    fn compile_patterns(&mut self, roots: &[SchemaRef]) -> Result<(), CompileError> {
        let order = self.pattern_order(roots);
        let engine = self.state.config.pattern_engine.clone();
        for (target, path) in order {
            let Some(document) = target
                .document
                .index()
                .checked_sub(self.first)
                .and_then(|offset| self.documents.get_mut(offset))
            else {
                continue;
            };
            let Some(node) = document.nodes.get_mut(target.node.index()) else {
                continue;
            };
            let SchemaBody::Keywords(keywords) = &mut node.body else {
                continue;
            };
            if let Some(pattern) = keywords.pattern.as_mut() {
                compile_pattern(pattern, &engine, &format!("{path}/pattern"), "pattern")?;
            }
            for (pattern, _) in keywords.pattern_properties.iter_mut().flatten() {
                let location = format!(
                    "{path}/patternProperties/{}",
                    escape_segment(&pattern.source)
                );
                compile_pattern(pattern, &engine, &location, "patternProperties")?;
            }
        }
        Ok(())
    }

    fn pattern_order(&self, roots: &[SchemaRef]) -> Vec<(SchemaRef, String)> {
        let mut visited = AHashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<(SchemaRef, String)> =
            roots.iter().rev().map(|root| (*root, String::new())).collect();
        while let Some((target, path)) = stack.pop() {
            if target.document.index() < self.first || !visited.insert(target) {
                continue;
            }
            let Some(keywords) = self.node(target).and_then(|node| node.keywords()) else {
                continue;
            };
            if keywords.has_patterns() {
                order.push((target, path.clone()));
            }
            let mut next = Vec::new();
            for (segments, child) in keywords.applicator_children() {
                let mut child_path = path.clone();
                for segment in &segments {
                    child_path.push('/');
                    child_path.push_str(&escape_segment(segment));
                }
                next.push((target.sibling(child), child_path));
            }
            for (keyword, reference) in [
                ("$ref", &keywords.reference),
                ("$dynamicRef", &keywords.dynamic_reference),
            ] {
                if let Some(resolved) = reference
                    .as_ref()
                    .and_then(|reference| self.lookup(&reference.target).ok())
                {
                    next.push((resolved, format!("{path}/{keyword}")));
                }
            }
            stack.extend(next.into_iter().rev());
        }
        for (offset, document) in self.documents.iter().enumerate() {
            let id = DocumentId::new(self.first + offset);
            for (index, node) in document.nodes.iter().enumerate() {
                let target = SchemaRef::new(id, NodeId::new(index));
                if node.keywords().is_some_and(Keywords::has_patterns) && visited.insert(target) {
                    order.push((target, node.location.as_str().to_string()));
                }
            }
        }
        order
    }
}

fn compile_pattern(
    pattern: &mut Pattern,
    engine: &PatternEngine,
    location: &str,
    keyword: &'static str,
) -> Result<(), CompileError> {
    match regex::compile(&pattern.source, engine) {
        Ok(compiled) => {
            pattern.compiled = Some(compiled);
            Ok(())
        }
        Err(message) => {
            tracing::debug!(location, pattern = %pattern.source, "Invalid regular expression");
            Err(CompileError::invalid_pattern(
                location,
                keyword,
                &pattern.source,
                message,
            ))
        }
    }
}

impl Registry {
    /// An empty registry with default options.
    #[must_use]
    pub fn new() -> Registry {
        Registry::with_config(Config::default(), uri::default_root())
    }

    /// Configure a new registry.
    #[must_use]
    pub fn options() -> RegistryOptions {
        RegistryOptions::default()
    }

    pub(crate) fn with_config(config: Config, default_base: Url) -> Registry {
        Registry {
            inner: Arc::new(RwLock::new(RegistryState::new(config, default_base))),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.inner.read()
    }

    /// Compile a schema document.
    ///
    /// Without `base_uri` and without a root `$id`, the document gets a fresh
    /// `anonymous-<n>` URI under the default base. Compiling a document equal to one already
    /// registered under the same URI returns the existing schema.
    ///
    /// References that can not be resolved yet do not fail compilation; see
    /// [`Registry::unresolved_references`].
    ///
    /// # Errors
    ///
    /// If the document is malformed, declares an unsupported dialect, contains an invalid
    /// pattern, or clashes with a different document registered under the same URI.
    pub fn compile(
        &self,
        schema: impl Into<JsonValue>,
        base_uri: Option<&str>,
    ) -> Result<Schema, CompileError> {
        let mut roots = self
            .inner
            .write()
            .compile(vec![(schema.into(), base_uri.map(str::to_string))])?;
        let root = roots.pop().ok_or_else(|| {
            CompileError::invalid_schema("", "Compilation produced no schema")
        })?;
        Ok(Schema::new(self.clone(), root))
    }

    /// Decode `bytes` with the configured codec and compile the result.
    ///
    /// # Errors
    ///
    /// If the bytes are not a valid document, or see [`Registry::compile`].
    pub fn compile_bytes(&self, bytes: &[u8], base_uri: Option<&str>) -> Result<Schema, CompileError> {
        let codec = Arc::clone(&self.read().config.codec);
        let schema = codec.decode(bytes)?;
        self.compile(schema, base_uri)
    }

    /// Compile documents that reference each other, all or nothing.
    ///
    /// Names are base URI hints resolved against the default base URI; a root `$id` still
    /// takes precedence. Input order does not matter. The result maps each input name to its
    /// compiled schema.
    ///
    /// # Errors
    ///
    /// See [`Registry::compile`]. No document of the batch is registered on failure.
    pub fn compile_batch<I, N, S>(&self, documents: I) -> Result<AHashMap<String, Schema>, CompileError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<JsonValue>,
    {
        let (names, inputs): (Vec<String>, Vec<(JsonValue, Option<String>)>) = documents
            .into_iter()
            .map(|(name, schema)| {
                let name = name.into();
                (name.clone(), (schema.into(), Some(name)))
            })
            .unzip();
        tracing::debug!(documents = names.len(), "Compiling schema batch");
        let roots = self.inner.write().compile(inputs)?;
        Ok(names
            .into_iter()
            .zip(roots)
            .map(|(name, root)| (name, Schema::new(self.clone(), root)))
            .collect())
    }

    /// Resolve `reference` against the base URI of `from`.
    ///
    /// # Errors
    ///
    /// If the reference is malformed or does not resolve to a compiled schema.
    pub fn resolve(&self, from: &Schema, reference: &str) -> Result<Schema, Error> {
        let state = self.read();
        let base = state.resolve_base(from.root())?;
        let target = uri::resolve_against(&base, reference)?;
        let root = state.lookup(&target)?;
        Ok(Schema::new(self.clone(), root))
    }

    /// Resolve `reference` as a `$dynamicRef` evaluated inside `scope`.
    ///
    /// `scope` lists the entered schemas from the outermost to the innermost; the reference is
    /// resolved statically against the innermost one.
    ///
    /// # Errors
    ///
    /// If the reference is malformed or its static target does not exist.
    pub fn resolve_dynamic(&self, scope: &[Schema], reference: &str) -> Result<Schema, Error> {
        let state = self.read();
        let mut dynamic = DynamicScope::new();
        for schema in scope {
            if let Some(node) = state.node(schema.root()) {
                dynamic.enter(&node.base, schema.root());
            }
        }
        let base = match scope.last() {
            Some(innermost) => state.resolve_base(innermost.root())?,
            None => state.default_base.clone(),
        };
        let target = uri::resolve_against(&base, reference)?;
        let root = resolver::resolve_dynamic(&*state, &dynamic, &target)?;
        Ok(Schema::new(self.clone(), root))
    }

    /// Change the base URI used for anonymous documents and batch names.
    ///
    /// # Errors
    ///
    /// If `base_uri` is not an absolute URI.
    pub fn set_default_base_uri(&self, base_uri: &str) -> Result<(), CompileError> {
        let base = uri::from_str(base_uri)?;
        tracing::debug!(base = %base, "Default base URI changed");
        self.inner.write().default_base = base;
        Ok(())
    }

    #[must_use]
    pub fn default_base_uri(&self) -> String {
        self.read().default_base.to_string()
    }

    /// The compiled schema registered under `uri`, if any. Fragments are honored.
    #[must_use]
    pub fn get_compiled_schema(&self, uri: &str) -> Option<Schema> {
        let state = self.read();
        let target = uri::resolve_against(&state.default_base, uri).ok()?;
        let root = state.lookup(&target).ok()?;
        Some(Schema::new(self.clone(), root))
    }

    /// References reachable from `schema` that do not resolve to any compiled schema.
    #[must_use]
    pub fn unresolved_references(&self, schema: &Schema) -> Vec<String> {
        self.read().unresolved_from(schema.root())
    }

    /// Register a function producing default values.
    ///
    /// A `default` keyword whose value is the string `"<name>()"` is replaced by the function's
    /// result in [`Schema::default_value`].
    pub fn register_default_function<N, F>(&self, name: N, function: F)
    where
        N: Into<String>,
        F: Fn() -> JsonValue + Send + Sync + 'static,
    {
        self.inner
            .write()
            .defaults
            .insert(name.into(), Arc::new(function));
    }

    pub(crate) fn default_function(&self, name: &str) -> Option<DefaultFunction> {
        self.read().defaults.get(name).cloned()
    }

    /// Number of compiled documents, including loaded ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn ptr_eq(&self, other: &Registry) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("Registry")
            .field("documents", &state.documents.len())
            .field("default_base", &state.default_base.as_str())
            .field("config", &state.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    type BoxError = Box<dyn std::error::Error + Send + Sync>;

    #[test]
    fn anonymous_documents_get_distinct_uris() {
        let registry = Registry::new();
        let first = registry
            .compile(&json!({"type": "string"}), None)
            .expect("Valid schema");
        let second = registry
            .compile(&json!({"type": "string"}), None)
            .expect("Valid schema");
        assert_eq!(first.uri(), "json-schema:///anonymous-1");
        assert_eq!(second.uri(), "json-schema:///anonymous-2");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn recompiling_same_document_is_idempotent() {
        let registry = Registry::new();
        let schema = json!({"$id": "http://example.com/a.json", "type": "string"});
        let first = registry.compile(&schema, None).expect("Valid schema");
        let second = registry.compile(&schema, None).expect("Valid schema");
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn different_document_under_same_uri() {
        let registry = Registry::new();
        registry
            .compile(&json!({"$id": "http://example.com/a.json", "type": "string"}), None)
            .expect("Valid schema");
        let error = registry
            .compile(&json!({"$id": "http://example.com/a.json", "type": "integer"}), None)
            .expect_err("Should clash");
        assert!(matches!(error, CompileError::DuplicateUri { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn embedded_resource_clash() {
        let registry = Registry::new();
        let error = registry
            .compile(
                &json!({
                    "$id": "http://example.com/root.json",
                    "$defs": {
                        "a": {"$id": "item.json"},
                        "b": {"$id": "item.json"}
                    }
                }),
                None,
            )
            .expect_err("Should clash");
        assert!(matches!(error, CompileError::DuplicateUri { .. }));
    }

    #[test_case("https://json-schema.org/draft/2020-12/schema", true)]
    #[test_case("https://json-schema.org/draft/2020-12/schema#", true)]
    #[test_case("http://json-schema.org/draft-07/schema#", false)]
    fn dialects(dialect: &str, supported: bool) {
        let registry = Registry::new();
        let result = registry.compile(&json!({"$schema": dialect}), None);
        assert_eq!(result.is_ok(), supported, "{result:?}");
        if !supported {
            assert!(matches!(
                result,
                Err(CompileError::UnsupportedDialect { ref location, .. }) if location == "#/$schema"
            ));
        }
    }

    #[test]
    fn custom_metaschema_in_same_batch() {
        let registry = Registry::new();
        let compiled = registry.compile_batch([
            (
                "http://example.com/schema.json",
                json!({"$schema": "http://example.com/meta.json", "type": "object"}),
            ),
            ("http://example.com/meta.json", json!({"type": "object"})),
        ]);
        assert!(compiled.is_ok(), "{compiled:?}");
    }

    #[test]
    fn failed_batch_leaves_registry_untouched() {
        let registry = Registry::new();
        let error = registry
            .compile_batch([
                ("a.json", json!({"$ref": "b.json"})),
                ("b.json", json!({"pattern": "("})),
            ])
            .expect_err("Invalid pattern");
        assert!(matches!(error, CompileError::InvalidPattern { .. }));
        assert!(registry.is_empty());
        assert!(registry.get_compiled_schema("a.json").is_none());
    }

    #[test]
    fn pending_references_resolve_later() {
        let registry = Registry::new();
        let schema = registry
            .compile(&json!({"$ref": "http://example.com/later.json"}), None)
            .expect("Unresolved references are not fatal");
        assert_eq!(
            registry.unresolved_references(&schema),
            vec!["http://example.com/later.json".to_string()]
        );
        registry
            .compile(&json!({"type": "integer"}), Some("http://example.com/later.json"))
            .expect("Valid schema");
        assert!(registry.unresolved_references(&schema).is_empty());
        assert!(schema.is_valid(&json!(1)));
        assert!(!schema.is_valid(&json!("1")));
    }

    #[test]
    fn loaders_fetch_missing_documents() {
        let registry = Registry::options()
            .with_loader("mem", |uri: &Url| -> Result<Vec<u8>, BoxError> {
                assert_eq!(uri.as_str(), "mem://schemas/name.json");
                Ok(br#"{"type": "string", "minLength": 1}"#.to_vec())
            })
            .build()
            .expect("Valid options");
        let schema = registry
            .compile(
                &json!({"properties": {"name": {"$ref": "mem://schemas/name.json"}}}),
                None,
            )
            .expect("Loaded");
        assert!(schema.is_valid(&json!({"name": "x"})));
        assert!(!schema.is_valid(&json!({"name": ""})));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn loader_failure_is_reported() {
        let registry = Registry::options()
            .with_loader("mem", |_: &Url| -> Result<Vec<u8>, BoxError> {
                Err("boom".into())
            })
            .build()
            .expect("Valid options");
        let error = registry
            .compile(&json!({"$ref": "mem://missing.json"}), None)
            .expect_err("Loader fails");
        assert!(matches!(error, CompileError::Load { ref uri, .. } if uri == "mem://missing.json"));
    }

    #[test]
    fn resolve_fragments() {
        let registry = Registry::new();
        let root = registry
            .compile(
                &json!({
                    "$id": "http://example.com/root.json",
                    "$defs": {
                        "positive": {"$anchor": "positive", "minimum": 0},
                        "a/b": {"type": "string"}
                    }
                }),
                None,
            )
            .expect("Valid schema");
        let anchored = registry.resolve(&root, "#positive").expect("Anchor exists");
        assert!(!anchored.is_valid(&json!(-1)));
        let pointed = registry.resolve(&root, "#/$defs/a~1b").expect("Pointer exists");
        assert!(!pointed.is_valid(&json!(1)));
        assert!(matches!(
            registry.resolve(&root, "#/$defs/missing"),
            Err(Error::PointerToNowhere { .. })
        ));
        assert!(matches!(
            registry.resolve(&root, "#nope"),
            Err(Error::NoSuchAnchor { .. })
        ));
        assert!(matches!(
            registry.resolve(&root, "http://example.com/other.json"),
            Err(Error::Unresolvable { .. })
        ));
    }

    #[test]
    fn default_base_uri_can_change() {
        let registry = Registry::new();
        registry
            .set_default_base_uri("http://example.com/schemas/")
            .expect("Valid URI");
        let schema = registry
            .compile(&json!({}), Some("thing.json"))
            .expect("Valid schema");
        assert_eq!(schema.uri(), "http://example.com/schemas/thing.json");
        assert!(registry.get_compiled_schema("thing.json").is_some());
        assert!(registry.set_default_base_uri("relative/").is_err());
    }
}
