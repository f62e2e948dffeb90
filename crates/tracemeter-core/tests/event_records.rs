//! Event record deserialization and value coercion.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tracemeter_core::{PropValue, TraceEvent};

#[test]
fn parse_event_min() {
    let s = r#"{
        "object": { "class_name": "SomeModule", "id": "1" },
        "caller": { "function_name": "foo", "filename": "mod.rs" }
    }"#;
    let ev: TraceEvent = serde_json::from_str(s).unwrap();
    assert!(ev.id.is_none());
    assert!(ev.parent_object.is_none());
    assert!(ev.object.props.is_empty());
}

#[test]
fn parse_event_full() {
    let s = r#"{
        "id": "foobar",
        "object": { "class_name": "Child", "id": "2", "props": { "n": 0, "ok": false } },
        "parent_object": { "class_name": "Parent", "id": "1" },
        "caller": { "function_name": "foo", "filename": "mod.rs", "props": { "baz": 42, "r": 0.5, "s": "x" } }
    }"#;
    let ev: TraceEvent = serde_json::from_str(s).unwrap();
    assert_eq!(ev.id.as_deref(), Some("foobar"));
    assert_eq!(ev.object.props["n"], PropValue::Int(0));
    assert_eq!(ev.object.props["ok"], PropValue::Bool(false));
    assert_eq!(ev.caller.props["baz"].to_string(), "42");
    assert_eq!(ev.caller.props["r"].to_string(), "0.5");
    assert_eq!(ev.caller.props["s"].to_string(), "x");
    assert_eq!(ev.parent_object.unwrap().class_name, "Parent");
}

#[test]
fn unknown_fields_rejected() {
    let s = r#"{
        "object": { "class_name": "A", "id": "1", "klass": "typo" },
        "caller": { "function_name": "foo", "filename": "mod.rs" }
    }"#;
    assert!(serde_json::from_str::<TraceEvent>(s).is_err());
}
