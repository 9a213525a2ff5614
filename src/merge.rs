//! Injection of flattened answers into the question document.
//!
//! The question document is an arbitrarily nested object/array tree that may
//! contain, at any depth, objects carrying a `fields` array and/or a
//! `repeatingFields` array. Matching is by the field's `id`; a match writes
//! the answer's text form into the field's `answer` member.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::*;

/// Counters accumulated over one merge pass. Observational only; the merge
/// outcome never depends on them.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Field objects carrying a text `id`.
    pub fields_seen: usize,
    /// Fields that received an `answer`.
    pub matched: usize,
    /// Distinct identifiers with no corresponding answer, in document order.
    pub unmatched: Vec<String>,
}

/// Walk the question tree and attach answers in place.
///
/// Fields without a text `id`, and identifiers absent from `answers`, are
/// skipped. An existing `answer` member is overwritten, so merging twice with
/// the same map is the same as merging once.
pub fn merge_answers(node: &mut Value, answers: &IndexMap<String, Value>) -> MergeStats {
    let mut stats = MergeStats::default();
    process_node(node, answers, &mut stats);
    stats
}

fn process_node(node: &mut Value, answers: &IndexMap<String, Value>, stats: &mut MergeStats) {
    match node {
        Value::Object(members) => {
            if let Some(Value::Array(fields)) = members.get_mut("fields") {
                process_fields(fields, answers, stats);
            }

            // Each repetition of a repeating group is itself a field-bearing
            // object, so it is walked as a node of its own.
            if let Some(Value::Array(repetitions)) = members.get_mut("repeatingFields") {
                for repetition in repetitions.iter_mut() {
                    process_node(repetition, answers, stats);
                }
            }

            // Generic descent through every other container member, so the
            // walk needs no knowledge of the forms/tabs/sections nesting.
            for (name, child) in members.iter_mut() {
                if name == "repeatingFields" {
                    continue;
                }
                if child.is_object() || child.is_array() {
                    process_node(child, answers, stats);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                process_node(item, answers, stats);
            }
        }
        _ => {}
    }
}

fn process_fields(fields: &mut [Value], answers: &IndexMap<String, Value>, stats: &mut MergeStats) {
    for field in fields {
        let Value::Object(field_obj) = field else {
            continue;
        };

        if let Some(id) = field_obj.get("id").and_then(Value::as_str).map(str::to_owned) {
            stats.fields_seen += 1;
            if let Some(answer) = answers.get(&id) {
                trace!("matched field: {id}");
                field_obj.insert("answer".to_owned(), Value::String(answer_text(answer)));
                stats.matched += 1;
            } else {
                trace!("no answer for field: {id}");
                if !stats.unmatched.contains(&id) {
                    stats.unmatched.push(id);
                }
            }
        }

        // A field-level repeating group is a list of field objects, not of
        // generic containers, so it takes the field treatment recursively.
        if let Some(Value::Array(repetitions)) = field_obj.get_mut("repeatingFields") {
            process_fields(repetitions, answers, stats);
        }
    }
}

fn answer_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
