//! `--data` handling.

use anyhow::{Context, Result};
use serde_json::Value;

/// Parse `raw` as JSON, or read the JSON from a file when it starts with `@`.
pub fn read_data(raw: &str) -> Result<Value> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file: {}", path))?,
        None => raw.to_string(),
    };
    let value: Value = serde_json::from_str(&text).context("--data is not valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("--data must be a JSON object");
    }
    Ok(strip_id(value))
}

/// Shallow merge of `patch` over `base`. Identifiers never survive the merge.
pub fn merge_object(base: Value, patch: Value) -> Result<Value> {
    let (Value::Object(mut base), Value::Object(patch)) = (base, patch) else {
        anyhow::bail!("only JSON objects can be merged");
    };
    for (key, value) in patch {
        base.insert(key, value);
    }
    Ok(strip_id(Value::Object(base)))
}

fn strip_id(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        map.remove("id");
    }
    value
}
