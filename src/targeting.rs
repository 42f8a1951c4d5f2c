//! Strictly typed targeting context consumed by the evaluation engine.
//!
//! Contexts are always constructible. Validation problems are recorded on the
//! value as a [`ContextError`] instead of being returned, so an invalid
//! context can still be handed to the engine, which reports it as an
//! evaluation error.

use itertools::Itertools;
use serde_json::{Map, Value};
use thiserror::Error;

pub const DEFAULT_KIND: &str = "user";
pub const MULTI_KIND: &str = "multi";

/// Why a targeting context is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context key must not be empty")]
    EmptyKey,

    #[error("context kind must not be empty")]
    EmptyKind,

    #[error("context kind cannot be '{0}'")]
    ReservedKind(String),

    #[error("context kind '{0}' contains characters other than letters, digits, '.', '_' or '-'")]
    InvalidKindChars(String),

    #[error("multi-kind context must contain at least one kind")]
    EmptyMulti,

    #[error("multi-kind context contains more than one '{0}' context")]
    DuplicateKind(String),

    #[error("multi-kind context member '{kind}' is invalid: {source}")]
    InvalidMember {
        kind: String,
        source: Box<ContextError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AttributeRefError {
    #[error("attribute reference is empty")]
    Empty,

    #[error("attribute reference contains an empty path component")]
    EmptyComponent,

    #[error("attribute reference contains an invalid '~' escape")]
    InvalidEscape,
}

/// Reference to an attribute, either a plain name (`address`) or a
/// slash-delimited path (`/address/city`) where `~1` stands for `/` and `~0`
/// for `~`.
///
/// Malformed references are kept and report their problem via
/// [`AttributeRef::error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRef {
    raw: String,
    components: Vec<String>,
    error: Option<AttributeRefError>,
}

impl AttributeRef {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        match parse_components(&raw) {
            Ok(components) => Self {
                raw,
                components,
                error: None,
            },
            Err(e) => Self {
                raw,
                components: Vec::new(),
                error: Some(e),
            },
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Unescaped path components; empty when the reference is invalid.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<AttributeRefError> {
        self.error
    }
}

fn parse_components(raw: &str) -> Result<Vec<String>, AttributeRefError> {
    if raw.is_empty() {
        return Err(AttributeRefError::Empty);
    }
    match raw.strip_prefix('/') {
        Some(path) => path.split('/').map(unescape_component).collect(),
        None => Ok(vec![raw.to_string()]),
    }
}

fn unescape_component(component: &str) -> Result<String, AttributeRefError> {
    if component.is_empty() {
        return Err(AttributeRefError::EmptyComponent);
    }
    let mut out = String::with_capacity(component.len());
    let mut chars = component.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return Err(AttributeRefError::InvalidEscape),
        }
    }
    Ok(out)
}

fn validate_kind(kind: &str) -> Result<(), ContextError> {
    if kind.is_empty() {
        return Err(ContextError::EmptyKind);
    }
    if kind == "kind" || kind == MULTI_KIND {
        return Err(ContextError::ReservedKind(kind.to_string()));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
    if !kind.chars().all(allowed) {
        return Err(ContextError::InvalidKindChars(kind.to_string()));
    }
    Ok(())
}

/// One evaluation subject of a single kind.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleContext {
    kind: String,
    key: String,
    name: Option<String>,
    anonymous: Option<bool>,
    attributes: Map<String, Value>,
    private_attributes: Vec<AttributeRef>,
    error: Option<ContextError>,
}

impl SingleContext {
    pub fn builder(kind: impl Into<String>, key: impl Into<String>) -> SingleContextBuilder {
        SingleContextBuilder {
            kind: kind.into(),
            key: key.into(),
            name: None,
            anonymous: None,
            attributes: Map::new(),
            private_attributes: Vec::new(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The identifier, or `None` if the context is invalid.
    pub fn key(&self) -> Option<&str> {
        self.error.is_none().then(|| self.key.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn anonymous(&self) -> Option<bool> {
        self.anonymous
    }

    /// Custom attributes, excluding the built-in ones.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn private_attributes(&self) -> &[AttributeRef] {
        &self.private_attributes
    }

    /// Look up a built-in (`kind`, `key`, `name`, `anonymous`) or custom
    /// attribute by name.
    pub fn get(&self, attribute: &str) -> Option<Value> {
        match attribute {
            "kind" => Some(Value::String(self.kind.clone())),
            "key" => Some(Value::String(self.key.clone())),
            "name" => self.name.clone().map(Value::String),
            "anonymous" => self.anonymous.map(Value::Bool),
            other => self.attributes.get(other).cloned(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&ContextError> {
        self.error.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct SingleContextBuilder {
    kind: String,
    key: String,
    name: Option<String>,
    anonymous: Option<bool>,
    attributes: Map<String, Value>,
    private_attributes: Vec<AttributeRef>,
}

impl SingleContextBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = Some(anonymous);
        self
    }

    pub fn set(mut self, attribute: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(attribute.into(), value);
        self
    }

    pub fn private_attribute(mut self, reference: AttributeRef) -> Self {
        self.private_attributes.push(reference);
        self
    }

    pub fn build(self) -> SingleContext {
        let error = validate_kind(&self.kind)
            .and_then(|()| {
                if self.key.is_empty() {
                    Err(ContextError::EmptyKey)
                } else {
                    Ok(())
                }
            })
            .err();
        SingleContext {
            kind: self.kind,
            key: self.key,
            name: self.name,
            anonymous: self.anonymous,
            attributes: self.attributes,
            private_attributes: self.private_attributes,
            error,
        }
    }
}

/// Several single contexts of distinct kinds evaluated together.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiContext {
    contexts: Vec<SingleContext>,
    error: Option<ContextError>,
}

impl MultiContext {
    /// Members keep the order they are given in.
    pub fn new(contexts: Vec<SingleContext>) -> Self {
        let error = Self::validate(&contexts).err();
        Self { contexts, error }
    }

    fn validate(contexts: &[SingleContext]) -> Result<(), ContextError> {
        if contexts.is_empty() {
            return Err(ContextError::EmptyMulti);
        }
        if let Some((kind, e)) = contexts
            .iter()
            .find_map(|c| c.error().map(|e| (c.kind(), e)))
        {
            return Err(ContextError::InvalidMember {
                kind: kind.to_string(),
                source: Box::new(e.clone()),
            });
        }
        if let Some(kind) = contexts.iter().map(SingleContext::kind).duplicates().next() {
            return Err(ContextError::DuplicateKind(kind.to_string()));
        }
        Ok(())
    }

    pub fn contexts(&self) -> &[SingleContext] {
        &self.contexts
    }

    pub fn individual_context(&self, kind: &str) -> Option<&SingleContext> {
        self.contexts.iter().find(|c| c.kind() == kind)
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&ContextError> {
        self.error.as_ref()
    }
}

/// Context handed to the evaluation engine.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetingContext {
    Single(SingleContext),
    Multi(MultiContext),
}

impl TargetingContext {
    /// Combine contexts into a multi-kind context. A lone context is
    /// returned as itself.
    pub fn multi(mut contexts: Vec<SingleContext>) -> Self {
        match contexts.pop() {
            Some(only) if contexts.is_empty() => Self::Single(only),
            Some(last) => {
                contexts.push(last);
                Self::Multi(MultiContext::new(contexts))
            }
            None => Self::Multi(MultiContext::new(contexts)),
        }
    }

    /// The context kind; `"multi"` for multi-kind contexts.
    pub fn kind(&self) -> &str {
        match self {
            Self::Single(c) => c.kind(),
            Self::Multi(_) => MULTI_KIND,
        }
    }

    /// Only valid single contexts carry an identifier.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Single(c) => c.key(),
            Self::Multi(_) => None,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }

    pub fn is_valid(&self) -> bool {
        self.error().is_none()
    }

    pub fn error(&self) -> Option<&ContextError> {
        match self {
            Self::Single(c) => c.error(),
            Self::Multi(m) => m.error(),
        }
    }

    pub fn individual_context(&self, kind: &str) -> Option<&SingleContext> {
        match self {
            Self::Single(c) => (c.kind() == kind).then_some(c),
            Self::Multi(m) => m.individual_context(kind),
        }
    }

    pub fn individual_context_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multi(m) => m.contexts().len(),
        }
    }
}

impl From<SingleContext> for TargetingContext {
    fn from(context: SingleContext) -> Self {
        Self::Single(context)
    }
}

impl From<MultiContext> for TargetingContext {
    fn from(context: MultiContext) -> Self {
        Self::Multi(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn plain_attribute_ref_is_single_component() {
        let r = AttributeRef::new("name");
        assert!(r.is_valid());
        assert_eq!(r.components(), ["name".to_string()]);
    }

    #[test]
    fn slash_path_is_split_and_unescaped() {
        let r = AttributeRef::new("/address/a~1b~0c");
        assert!(r.is_valid());
        assert_eq!(r.components(), ["address".to_string(), "a/b~c".to_string()]);
        assert_eq!(r.as_str(), "/address/a~1b~0c");
    }

    #[test]
    fn malformed_attribute_refs_keep_raw_text() {
        assert_eq!(AttributeRef::new("").error(), Some(AttributeRefError::Empty));
        assert_eq!(AttributeRef::new("/").error(), Some(AttributeRefError::EmptyComponent));
        assert_eq!(AttributeRef::new("/a//b").error(), Some(AttributeRefError::EmptyComponent));
        let bad = AttributeRef::new("/a~2");
        assert_eq!(bad.error(), Some(AttributeRefError::InvalidEscape));
        assert_eq!(bad.as_str(), "/a~2");
        assert!(bad.components().is_empty());
    }

    #[test]
    fn single_context_validation() {
        let ok = SingleContext::builder("org", "o1").build();
        assert!(ok.is_valid());
        assert_eq!(ok.key(), Some("o1"));

        let empty_key = SingleContext::builder("user", "").build();
        assert_eq!(empty_key.error(), Some(&ContextError::EmptyKey));
        assert_eq!(empty_key.key(), None);

        let reserved = SingleContext::builder("kind", "k").build();
        assert_eq!(reserved.error(), Some(&ContextError::ReservedKind("kind".into())));

        let bad_chars = SingleContext::builder("a b", "k").build();
        assert_eq!(bad_chars.error(), Some(&ContextError::InvalidKindChars("a b".into())));
    }

    #[test]
    fn get_reads_builtin_and_custom_attributes() {
        let c = SingleContext::builder("user", "u1")
            .name("Sandy")
            .anonymous(true)
            .set("lastName", json!("Beaches"))
            .build();
        assert_eq!(c.get("kind"), Some(json!("user")));
        assert_eq!(c.get("key"), Some(json!("u1")));
        assert_eq!(c.get("name"), Some(json!("Sandy")));
        assert_eq!(c.get("anonymous"), Some(json!(true)));
        assert_eq!(c.get("lastName"), Some(json!("Beaches")));
        assert_eq!(c.get("email"), None);
    }

    #[test]
    fn multi_context_validity() {
        let user = SingleContext::builder("user", "u").build();
        let org = SingleContext::builder("org", "o").build();

        let multi = TargetingContext::multi(vec![user.clone(), org]);
        assert!(multi.is_valid());
        assert!(multi.is_multi());
        assert_eq!(multi.key(), None);
        assert_eq!(multi.individual_context_count(), 2);
        assert_eq!(multi.individual_context("org").and_then(SingleContext::key), Some("o"));

        let lone = TargetingContext::multi(vec![user.clone()]);
        assert!(!lone.is_multi());
        assert_eq!(lone.kind(), "user");
        assert_eq!(lone.key(), Some("u"));

        let empty = TargetingContext::multi(Vec::new());
        assert_eq!(empty.error(), Some(&ContextError::EmptyMulti));

        let dup = TargetingContext::multi(vec![user.clone(), user.clone()]);
        assert_eq!(dup.error(), Some(&ContextError::DuplicateKind("user".into())));

        let invalid = SingleContext::builder("org", "").build();
        let mixed = TargetingContext::multi(vec![user, invalid]);
        assert_eq!(
            mixed.error(),
            Some(&ContextError::InvalidMember {
                kind: "org".into(),
                source: Box::new(ContextError::EmptyKey),
            })
        );
    }
}
