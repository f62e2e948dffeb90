//! Call-site event records.
//!
//! The instrumentation layer builds one `TraceEvent` per traced call and hands
//! it to an instrument, which consumes it immediately. Required fields are
//! plain `String`s; optional ones are `Option`s. Nothing here is validated:
//! the builder trusts whoever constructed the record.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// A free-form property value.
///
/// Falsy values (`false`, `0`, `""`) are still values: only an absent key
/// counts as "not present".
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Int(i) => write!(f, "{i}"),
            PropValue::Float(x) => write!(f, "{x}"),
            PropValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Str(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::Str(v)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        PropValue::Int(v)
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        PropValue::Int(i64::from(v))
    }
}

impl From<u32> for PropValue {
    fn from(v: u32) -> Self {
        PropValue::Int(i64::from(v))
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        PropValue::Float(v)
    }
}

/// Property bag attached to an object or caller.
pub type Props = BTreeMap<String, PropValue>;

/// An instance at the call site.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectRef {
    pub class_name: String,
    /// Caller-assigned, expected unique per logical instance.
    pub id: String,
    #[serde(default)]
    pub props: Props,
}

impl ObjectRef {
    pub fn new(class_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            id: id.into(),
            props: Props::new(),
        }
    }

    /// Attach a property (builder style).
    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }
}

/// The function that emitted the event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallerRef {
    pub function_name: String,
    pub filename: String,
    #[serde(default)]
    pub props: Props,
}

impl CallerRef {
    pub fn new(function_name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            filename: filename.into(),
            props: Props::new(),
        }
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }
}

/// One instrumented call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraceEvent {
    #[serde(default)]
    pub id: Option<String>,
    pub object: ObjectRef,
    #[serde(default)]
    pub parent_object: Option<ObjectRef>,
    pub caller: CallerRef,
}

impl TraceEvent {
    pub fn new(object: ObjectRef, caller: CallerRef) -> Self {
        Self {
            id: None,
            object,
            parent_object: None,
            caller,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_parent(mut self, parent: ObjectRef) -> Self {
        self.parent_object = Some(parent);
        self
    }
}
