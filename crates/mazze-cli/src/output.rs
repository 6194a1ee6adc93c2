//! Output formatting

use serde_json::{json, Map, Value};

/// Output builder for plain or JSON CLI output
#[derive(Debug)]
pub struct Output {
    json_mode: bool,
    fields: Map<String, Value>,
    lines: Vec<String>,
}

impl Output {
    /// Create a new output builder
    pub fn new(json_mode: bool) -> Self {
        Self {
            json_mode,
            fields: Map::new(),
            lines: Vec::new(),
        }
    }

    /// Add a string field, shown as `key: value` in plain mode
    pub fn field(mut self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        self.lines.push(format!("{}: {}", key, value));
        self.fields.insert(key.to_string(), Value::String(value));
        self
    }

    /// Add an optional string field, `null` when absent
    pub fn field_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self.field_value(key, Value::Null),
        }
    }

    /// Add a u64 field
    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.lines.push(format!("{}: {}", key, value));
        self.fields.insert(key.to_string(), Value::Number(value.into()));
        self
    }

    /// Add a JSON value field
    pub fn field_value(mut self, key: &str, value: Value) -> Self {
        let text = match &value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.lines.push(format!("{}: {}", key, text));
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Replace the plain-mode rendering with a single message
    pub fn message(mut self, msg: &str) -> Self {
        self.lines = vec![msg.to_string()];
        self
    }

    /// Render without printing
    pub fn render(&self) -> String {
        if self.json_mode {
            serde_json::to_string_pretty(&json!(self.fields)).unwrap_or_default()
        } else {
            self.lines.join("\n")
        }
    }

    /// Print the output
    pub fn print(self) {
        println!("{}", self.render());
    }
}
