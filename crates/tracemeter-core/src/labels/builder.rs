//! Event -> `LabelSet`.
//!
//! Rules, in order:
//! 1. object class/id and caller function/file are always present
//! 2. `id` only when the event id is non-empty
//! 3. parent class/id together, only when a parent with a non-empty class is given
//! 4. allowed props projected per scope, where present
//!
//! Every name emitted is declared by the matching `LabelSchema`.

use crate::event::{ObjectRef, TraceEvent};

use super::schema::{AllowedProps, LabelSet, Scope};
use super::{
    CALLER_FILENAME, CALLER_FUNCTIONNAME, ID, OBJECT_CLASSNAME, OBJECT_ID,
    PARENT_OBJECT_CLASSNAME, PARENT_OBJECT_ID,
};

/// Labels for one traced call (`LabelSchema::trace`).
pub fn build_trace_labels(event: &TraceEvent, allowed: &AllowedProps) -> LabelSet {
    let mut labels = LabelSet::new();

    labels.insert(OBJECT_CLASSNAME, event.object.class_name.as_str());
    labels.insert(OBJECT_ID, event.object.id.as_str());
    labels.insert(CALLER_FUNCTIONNAME, event.caller.function_name.as_str());
    labels.insert(CALLER_FILENAME, event.caller.filename.as_str());

    if let Some(id) = event.id.as_deref().filter(|id| !id.is_empty()) {
        labels.insert(ID, id);
    }

    let parent = present_parent(event.parent_object.as_ref());
    if let Some(p) = parent {
        insert_parent(p, &mut labels);
    }

    allowed.project(Scope::Object, &event.object.props, &mut labels);
    if let Some(p) = event.parent_object.as_ref() {
        allowed.project(Scope::ParentObject, &p.props, &mut labels);
    }
    allowed.project(Scope::Caller, &event.caller.props, &mut labels);

    labels
}

/// Labels for one allocation or disposal (`LabelSchema::lifetime`).
pub fn build_lifetime_labels(
    object: &ObjectRef,
    parent: Option<&ObjectRef>,
    allowed: &AllowedProps,
) -> LabelSet {
    let mut labels = LabelSet::new();

    labels.insert(OBJECT_CLASSNAME, object.class_name.as_str());
    labels.insert(OBJECT_ID, object.id.as_str());

    if let Some(p) = present_parent(parent) {
        insert_parent(p, &mut labels);
    }

    allowed.project(Scope::Object, &object.props, &mut labels);
    if let Some(p) = parent {
        allowed.project(Scope::ParentObject, &p.props, &mut labels);
    }

    labels
}

// Parent fields are gated on the class name only; the id rides along.
fn present_parent(parent: Option<&ObjectRef>) -> Option<&ObjectRef> {
    parent.filter(|p| !p.class_name.is_empty())
}

fn insert_parent(parent: &ObjectRef, labels: &mut LabelSet) {
    labels.insert(PARENT_OBJECT_CLASSNAME, parent.class_name.as_str());
    labels.insert(PARENT_OBJECT_ID, parent.id.as_str());
}
