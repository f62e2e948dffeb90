//! Label construction and cardinality control.
//!
//! - `sanitize`: property name -> label-name-safe string
//! - `schema`  : allowed-property vocabulary and the declared label names
//! - `builder` : event -> `LabelSet`, restricted to the declared names

pub mod builder;
pub mod sanitize;
pub mod schema;

pub use builder::{build_lifetime_labels, build_trace_labels};
pub use sanitize::sanitize;
pub use schema::{AllowedProps, LabelSchema, LabelSet, Scope};

/// Base label names.
pub const OBJECT_CLASSNAME: &str = "object_classname";
pub const OBJECT_ID: &str = "object_id";
pub const PARENT_OBJECT_CLASSNAME: &str = "parent_object_classname";
pub const PARENT_OBJECT_ID: &str = "parent_object_id";
pub const CALLER_FUNCTIONNAME: &str = "caller_functionname";
pub const CALLER_FILENAME: &str = "caller_filename";
pub const ID: &str = "id";
/// Sole label of the timer counter.
pub const NAME: &str = "name";
