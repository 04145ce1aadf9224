// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn extracts_result_field_from_wrapper_json() {
    let raw = json!({ "type": "result", "subtype": "success", "result": "the task text" }).to_string();
    assert_eq!(extract_result_field(&raw), "the task text");
}

#[test]
fn passes_through_non_wrapper_text_unchanged() {
    let raw = "{ \"task_kind\": \"execute\" }";
    assert_eq!(extract_result_field(raw), raw);
}

#[test]
fn passes_through_plain_text_unchanged() {
    assert_eq!(extract_result_field("not json at all"), "not json at all");
}

#[test]
fn extracts_bare_json_object() {
    let value = extract_json_object("{\"a\": 1}").unwrap();
    assert_eq!(value["a"], 1);
}

#[test]
fn extracts_json_object_surrounded_by_prose() {
    let text = "Here is the task:\n{\"a\": 1, \"b\": [1,2,3]}\nLet me know if this works.";
    let value = extract_json_object(text).unwrap();
    assert_eq!(value["a"], 1);
    assert_eq!(value["b"], json!([1, 2, 3]));
}

#[test]
fn braces_inside_string_literals_do_not_confuse_balancing() {
    let text = "{\"note\": \"contains a } brace\", \"n\": 2}";
    let value = extract_json_object(text).unwrap();
    assert_eq!(value["n"], 2);
}

#[test]
fn nested_objects_balance_correctly() {
    let text = "prefix {\"outer\": {\"inner\": 1}} suffix";
    let value = extract_json_object(text).unwrap();
    assert_eq!(value["outer"]["inner"], 1);
}

#[test]
fn returns_none_when_no_brace_present() {
    assert!(extract_json_object("no json here").is_none());
}

#[test]
fn returns_none_for_unbalanced_braces() {
    assert!(extract_json_object("{\"a\": 1").is_none());
}
