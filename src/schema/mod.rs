//! Declarative attribute schema: types, validators, and composition.
//!
//! The host runs these schemas at plan time; the engine re-runs them
//! pre-flight so cross-field invariants hold even for hand-fed values
//! (imports, movers, tests).

pub mod base;

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{ProviderError, Result};

pub use base::{compose, group_base, hosted_base, proxy_base};

/// Repository name pattern shared with the server.
pub static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9-][A-Za-z0-9_.-]*$").expect("name pattern is valid"));

/// Attribute value type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    String,
    Bool,
    Int,
    /// Ordered list of strings
    ListOfString,
    /// Unordered, duplicate-free set of strings
    SetOfString,
}

/// Value-level validation rule attached to an attribute.
#[derive(Debug, Clone)]
pub enum Validator {
    LengthBetween(usize, usize),
    /// Matches against a pre-compiled shared regex (e.g. [`NAME_PATTERN`]).
    Pattern(&'static Lazy<Regex>),
    IntBetween(i64, i64),
    IntAtLeast(i64),
    OneOf(&'static [&'static str]),
    /// Absolute URL restricted to the given schemes.
    UrlWithScheme(&'static [&'static str]),
    /// List/set must contain at least one element.
    NonEmpty,
    /// List elements must be unique.
    UniqueItems,
}

impl Validator {
    /// Check one host value against this rule.
    pub fn check(&self, value: &Value) -> std::result::Result<(), String> {
        match self {
            Validator::LengthBetween(min, max) => {
                let s = value.as_str().ok_or("expected a string")?;
                if s.len() < *min || s.len() > *max {
                    return Err(format!("length must be between {min} and {max}"));
                }
                Ok(())
            }
            Validator::Pattern(pattern) => {
                let s = value.as_str().ok_or("expected a string")?;
                if !pattern.is_match(s) {
                    return Err(format!("must match {}", pattern.as_str()));
                }
                Ok(())
            }
            Validator::IntBetween(min, max) => {
                let n = value.as_i64().ok_or("expected an integer")?;
                if n < *min || n > *max {
                    return Err(format!("must be between {min} and {max}"));
                }
                Ok(())
            }
            Validator::IntAtLeast(min) => {
                let n = value.as_i64().ok_or("expected an integer")?;
                if n < *min {
                    return Err(format!("must be at least {min}"));
                }
                Ok(())
            }
            Validator::OneOf(allowed) => {
                let s = value.as_str().ok_or("expected a string")?;
                if !allowed.contains(&s) {
                    return Err(format!("must be one of {allowed:?}, got {s:?}"));
                }
                Ok(())
            }
            Validator::UrlWithScheme(schemes) => {
                let s = value.as_str().ok_or("expected a string")?;
                let parsed =
                    url::Url::parse(s).map_err(|e| format!("not a well-formed URL: {e}"))?;
                if !schemes.contains(&parsed.scheme()) {
                    return Err(format!(
                        "URL scheme must be one of {schemes:?}, got {:?}",
                        parsed.scheme()
                    ));
                }
                Ok(())
            }
            Validator::NonEmpty => {
                let items = value.as_array().ok_or("expected a list")?;
                if items.is_empty() {
                    return Err("must not be empty".to_string());
                }
                Ok(())
            }
            Validator::UniqueItems => {
                let items = value.as_array().ok_or("expected a list")?;
                let mut seen = std::collections::BTreeSet::new();
                for item in items {
                    if !seen.insert(item.to_string()) {
                        return Err(format!("duplicate element {item}"));
                    }
                }
                Ok(())
            }
        }
    }
}

/// One schema attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub attr_type: AttrType,
    pub required: bool,
    pub computed: bool,
    pub sensitive: bool,
    /// Changing this attribute plans a destroy+create.
    pub force_new: bool,
    pub validators: Vec<Validator>,
}

impl Attribute {
    pub fn required(attr_type: AttrType) -> Self {
        Self {
            attr_type,
            required: true,
            computed: false,
            sensitive: false,
            force_new: false,
            validators: Vec::new(),
        }
    }

    pub fn optional(attr_type: AttrType) -> Self {
        Self {
            required: false,
            ..Self::required(attr_type)
        }
    }

    pub fn computed(attr_type: AttrType) -> Self {
        Self {
            required: false,
            computed: true,
            ..Self::required(attr_type)
        }
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_validator(mut self, v: Validator) -> Self {
        self.validators.push(v);
        self
    }
}

/// A nested block of attributes and sub-blocks.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub required: bool,
    pub attributes: BTreeMap<&'static str, Attribute>,
    pub blocks: BTreeMap<&'static str, Block>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required_block() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    pub fn block(mut self, name: &'static str, block: Block) -> Self {
        self.blocks.insert(name, block);
        self
    }

    /// Overlay `other` on top of self: its attributes and blocks win on key
    /// collision, nested blocks merge recursively. This is how a format
    /// fragment tightens a common block.
    pub fn merge(mut self, other: Block) -> Self {
        for (name, attribute) in other.attributes {
            self.attributes.insert(name, attribute);
        }
        for (name, block) in other.blocks {
            let merged = match self.blocks.remove(name) {
                Some(existing) => existing.merge(block),
                None => block,
            };
            self.blocks.insert(name, merged);
        }
        if other.required {
            self.required = true;
        }
        self
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<()> {
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => {
                return Err(ProviderError::validation_at(
                    path_or_root(path),
                    "expected an object",
                ))
            }
        };

        for (name, attribute) in &self.attributes {
            let child_path = join_path(path, name);
            match obj.get(*name) {
                None | Some(Value::Null) => {
                    if attribute.required && !attribute.computed {
                        return Err(ProviderError::validation_at(child_path, "is required"));
                    }
                }
                Some(v) => {
                    for validator in &attribute.validators {
                        validator
                            .check(v)
                            .map_err(|msg| ProviderError::validation_at(child_path.clone(), msg))?;
                    }
                }
            }
        }

        for (name, block) in &self.blocks {
            let child_path = join_path(path, name);
            match obj.get(*name) {
                None | Some(Value::Null) => {
                    if block.required {
                        return Err(ProviderError::validation_at(
                            child_path,
                            "block is required",
                        ));
                    }
                }
                Some(v) => block.validate_at(v, &child_path)?,
            }
        }

        Ok(())
    }
}

fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

fn path_or_root(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

/// The composed schema of one resource type.
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: u64,
    pub root: Block,
}

impl Schema {
    /// Walk a host value against the attribute tree. Returns the first
    /// violation as a `Validation` error carrying the attribute path.
    pub fn validate(&self, value: &Value) -> Result<()> {
        self.root.validate_at(value, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_pattern_accepts_and_rejects() {
        assert!(NAME_PATTERN.is_match("maven-central"));
        assert!(NAME_PATTERN.is_match("repo_1.x"));
        assert!(!NAME_PATTERN.is_match("_leading-underscore"));
        assert!(!NAME_PATTERN.is_match(".leading-dot"));
        assert!(!NAME_PATTERN.is_match("has space"));
        assert!(!NAME_PATTERN.is_match(""));
    }

    #[test]
    fn test_url_validator_requires_http_scheme() {
        let v = Validator::UrlWithScheme(&["http", "https"]);
        assert!(v.check(&json!("https://repo1.maven.org/maven2/")).is_ok());
        assert!(v.check(&json!("ftp://mirror.example.com")).is_err());
        assert!(v.check(&json!("not a url")).is_err());
    }

    #[test]
    fn test_merge_fragment_wins_on_collision() {
        let base = Block::new().attr(
            "write_policy",
            Attribute::optional(AttrType::String),
        );
        let fragment = Block::new().attr(
            "write_policy",
            Attribute::required(AttrType::String)
                .with_validator(Validator::OneOf(&["ALLOW", "ALLOW_ONCE", "DENY"])),
        );
        let merged = base.merge(fragment);
        assert!(merged.attributes["write_policy"].required);
        assert_eq!(merged.attributes["write_policy"].validators.len(), 1);
    }

    #[test]
    fn test_validation_error_carries_nested_path() {
        let schema = Schema {
            version: 1,
            root: Block::new().block(
                "group",
                Block::required_block().attr(
                    "member_names",
                    Attribute::required(AttrType::SetOfString)
                        .with_validator(Validator::NonEmpty),
                ),
            ),
        };
        let err = schema
            .validate(&json!({"group": {"member_names": []}}))
            .unwrap_err();
        match err {
            ProviderError::Validation { path, .. } => {
                assert_eq!(path.as_deref(), Some("group.member_names"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_block_reported() {
        let schema = Schema {
            version: 1,
            root: Block::new().block("proxy", Block::required_block()),
        };
        let err = schema.validate(&json!({})).unwrap_err();
        match err {
            ProviderError::Validation { path, .. } => {
                assert_eq!(path.as_deref(), Some("proxy"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
