//! Parser for `p4 -ztag` output
//!
//! Tagged output is a sequence of records separated by blank lines, each
//! field written as `... name value`. Lines without the `... ` prefix
//! continue the previous field's value.

use std::collections::HashMap;

const FIELD_PREFIX: &str = "... ";

/// One tagged record.
pub type ZtagRecord = HashMap<String, String>;

/// Split tagged output into records, preserving order.
pub fn parse(output: &str) -> Vec<ZtagRecord> {
    let mut records = Vec::new();
    let mut current = ZtagRecord::new();
    let mut last_key: Option<String> = None;

    for line in output.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            last_key = None;
            continue;
        }

        if let Some(field) = line.strip_prefix(FIELD_PREFIX) {
            let (key, value) = match field.split_once(' ') {
                Some((key, value)) => (key, value),
                None => (field, ""),
            };
            current.insert(key.to_string(), value.to_string());
            last_key = Some(key.to_string());
        } else if let Some(key) = &last_key {
            if let Some(value) = current.get_mut(key) {
                value.push('\n');
                value.push_str(line);
            }
        }
    }

    if !current.is_empty() {
        records.push(current);
    }

    records
}
