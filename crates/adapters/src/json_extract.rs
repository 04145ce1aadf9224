// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pulling structured output out of an LLM CLI's text (§4.6, §4.7): the
//! planner wrapper exposes a `.result` field holding the model's raw text,
//! and that text itself may wrap the actual JSON object in prose ("Here is
//! the task: { ... }"). Two independent, pure extraction steps, so each can
//! be tested without a subprocess in the loop.

use serde_json::Value;

/// Pull the `result` string out of a planner CLI's wrapper JSON
/// (`{"type":"result", "result": "...", ...}`, per `output_format=json`).
/// If `raw` is not itself a JSON object with a string `result` field, it is
/// assumed to already be the model's raw text and is returned unchanged —
/// tolerates planner CLIs that skip the wrapper.
pub fn extract_result_field(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Object(map)) => match map.get("result") {
            Some(Value::String(s)) => s.clone(),
            _ => raw.to_string(),
        },
        _ => raw.to_string(),
    }
}

/// Find the first balanced `{...}` substring in `text` and parse it as JSON.
/// Tolerant of surrounding prose and markdown code fences; brace-balancing
/// is string-aware so braces inside string literals don't throw off the
/// count.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;

    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        let ch = byte as char;
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + 1;
                    return serde_json::from_str(&text[start..end]).ok();
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[path = "json_extract_tests.rs"]
mod tests;
