//! In-place patch helpers for cached response shapes.
//!
//! Cached values come in three shapes: a flat array of application objects
//! (`job-applications`), a single application object, and a map of stage id
//! to application array (`applications-by-stage:*`). The helpers here edit
//! application records across all three without re-bucketing — a patched
//! record stays in its stage bucket until the reconciliation refetch moves
//! it.

use serde_json::{Map, Value};
use uuid::Uuid;

fn for_each_application(value: &mut Value, visit: &mut dyn FnMut(&mut Map<String, Value>)) {
    match value {
        Value::Array(items) => {
            for item in items {
                if let Value::Object(map) = item {
                    visit(map);
                }
            }
        }
        Value::Object(map) => {
            // A single application object carries an "id"; the by-stage
            // shape is a map of stage ids to arrays and does not.
            if map.contains_key("id") {
                visit(map);
            } else {
                for bucket in map.values_mut() {
                    if let Value::Array(items) = bucket {
                        for item in items {
                            if let Value::Object(map) = item {
                                visit(map);
                            }
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

/// Replaces every application record whose `id` matches the server's
/// returned object with that object. Returns whether anything matched.
pub(crate) fn replace_application(value: &mut Value, updated: &Value) -> bool {
    let Some(updated) = updated.as_object() else {
        return false;
    };
    let Some(id) = updated.get("id") else {
        return false;
    };

    let mut replaced = false;
    for_each_application(value, &mut |application| {
        if application.get("id") == Some(id) {
            *application = updated.clone();
            replaced = true;
        }
    });
    replaced
}

/// Rewrites the stage fields of every application record whose
/// `match_field` equals `match_id`, so the UI reflects the move before the
/// server confirms. Returns whether anything matched.
pub(crate) fn apply_stage_fields(
    value: &mut Value,
    match_field: &str,
    match_id: Uuid,
    to_stage_id: Uuid,
    to_stage_name: Option<&str>,
) -> bool {
    let match_id = Value::String(match_id.to_string());
    let mut patched = false;
    for_each_application(value, &mut |application| {
        if application.get(match_field) != Some(&match_id) {
            return;
        }
        application.insert(
            "currentPipelineStageId".to_string(),
            Value::String(to_stage_id.to_string()),
        );
        let name = to_stage_name
            .map(|name| Value::String(name.to_string()))
            .unwrap_or(Value::Null);
        application.insert("currentPipelineStageName".to_string(), name.clone());
        application.insert("stage".to_string(), name);
        patched = true;
    });
    patched
}
