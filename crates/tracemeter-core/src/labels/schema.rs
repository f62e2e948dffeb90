//! Allowed-property vocabulary and declared label names.
//!
//! Label names are fixed when an instrument is created. `LabelSchema` is that
//! declaration; the builder never emits a name outside it.

use std::collections::{BTreeMap, HashSet};

use crate::error::{Result, TraceMeterError};
use crate::event::Props;

use super::sanitize::sanitize;
use super::{
    CALLER_FILENAME, CALLER_FUNCTIONNAME, ID, NAME, OBJECT_CLASSNAME, OBJECT_ID,
    PARENT_OBJECT_CLASSNAME, PARENT_OBJECT_ID,
};

/// Where a property is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Object,
    ParentObject,
    Caller,
}

impl Scope {
    pub fn prefix(self) -> &'static str {
        match self {
            Scope::Object => "object",
            Scope::ParentObject => "parent_object",
            Scope::Caller => "caller",
        }
    }

    /// `{scope}_props_{sanitized}`.
    pub fn prop_label(self, sanitized: &str) -> String {
        format!("{}_props_{}", self.prefix(), sanitized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AllowedProp {
    raw: String,
    sanitized: String,
}

/// Ordered set of property names an instrument may project into labels.
///
/// Immutable once built. Exact duplicates collapse to the first occurrence;
/// two distinct names that sanitize to the same label are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedProps {
    props: Vec<AllowedProp>,
}

impl AllowedProps {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut props: Vec<AllowedProp> = Vec::new();
        let mut by_label: BTreeMap<String, String> = BTreeMap::new();

        for raw in names {
            let raw: String = raw.into();
            if props.iter().any(|p| p.raw == raw) {
                continue;
            }
            let sanitized = sanitize(&raw);
            if let Some(prev) = by_label.get(&sanitized) {
                return Err(TraceMeterError::InvalidLabel(format!(
                    "allowed props {prev:?} and {raw:?} both map to label suffix {sanitized:?}"
                )));
            }
            by_label.insert(sanitized.clone(), raw.clone());
            props.push(AllowedProp { raw, sanitized });
        }
        Ok(Self { props })
    }

    /// No allowed props.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// `(raw name, sanitized name)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|p| (p.raw.as_str(), p.sanitized.as_str()))
    }

    /// Project `props` through the vocabulary into `out` under `scope`.
    pub(crate) fn project(&self, scope: Scope, props: &Props, out: &mut LabelSet) {
        for p in &self.props {
            if let Some(v) = props.get(&p.raw) {
                out.insert(scope.prop_label(&p.sanitized), v.to_string());
            }
        }
    }
}

/// Label names declared for one instrument, in rendering order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSchema {
    names: Vec<String>,
    index: HashSet<String>,
}

impl LabelSchema {
    fn from_names(names: Vec<String>) -> Self {
        let index = names.iter().cloned().collect();
        Self { names, index }
    }

    /// Names for the trace counter: base fields plus every scope's props.
    pub fn trace(allowed: &AllowedProps) -> Self {
        let mut names: Vec<String> = [
            ID,
            OBJECT_CLASSNAME,
            OBJECT_ID,
            PARENT_OBJECT_CLASSNAME,
            PARENT_OBJECT_ID,
            CALLER_FUNCTIONNAME,
            CALLER_FILENAME,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for scope in [Scope::Object, Scope::ParentObject, Scope::Caller] {
            names.extend(allowed.iter().map(|(_, s)| scope.prop_label(s)));
        }
        Self::from_names(names)
    }

    /// Names for the lifetime gauge: no caller scope, no event id.
    pub fn lifetime(allowed: &AllowedProps) -> Self {
        let mut names: Vec<String> = [
            OBJECT_CLASSNAME,
            OBJECT_ID,
            PARENT_OBJECT_CLASSNAME,
            PARENT_OBJECT_ID,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for scope in [Scope::Object, Scope::ParentObject] {
            names.extend(allowed.iter().map(|(_, s)| scope.prop_label(s)));
        }
        Self::from_names(names)
    }

    /// The timer counter's single `name` label.
    pub fn timer() -> Self {
        Self::from_names(vec![NAME.to_string()])
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Whether every key of `labels` is declared here.
    pub fn admits(&self, labels: &LabelSet) -> bool {
        labels.keys().all(|k| self.contains(k))
    }
}

/// Sanitized label name -> raw value. Ordered, so equal sets hash equally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
