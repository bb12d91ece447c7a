//! Human-readable descriptions of tool invocations.

use serde_json::{Map, Value};

const DELEGATION_DESCRIPTION_MAX: usize = 200;
const COMMAND_DESCRIPTION_MAX: usize = 100;

/// Description and sub-agent metadata derived from a tool's input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDescription {
    pub description: String,
    pub subagent_type: Option<String>,
    pub subagent_model: Option<String>,
}

/// Describe one invocation of `tool_name` from its raw JSON input.
///
/// - the delegation tool: `description`, else `prompt` (200 chars), plus
///   `subagent_type` and `model`
/// - `Read`, `Write`, `Edit`: `file_path`
/// - `Bash`: `command` (100 chars)
/// - `Glob`, `Grep`: `pattern`
///
/// Any other tool, a missing field, or input that is not a JSON object
/// falls back to the tool name with no metadata.
pub fn describe(tool_name: &str, tool_input: Option<&str>, delegation_tool: &str) -> TaskDescription {
    let fallback = || TaskDescription {
        description: tool_name.to_string(),
        ..TaskDescription::default()
    };

    let Some(input) = tool_input.and_then(parse_object) else {
        return fallback();
    };

    if tool_name == delegation_tool {
        let description = text_field(&input, "description")
            .or_else(|| text_field(&input, "prompt"))
            .map(|d| truncate_chars(d, DELEGATION_DESCRIPTION_MAX))
            .unwrap_or_else(|| tool_name.to_string());
        return TaskDescription {
            description,
            subagent_type: text_field(&input, "subagent_type").map(str::to_string),
            subagent_model: text_field(&input, "model").map(str::to_string),
        };
    }

    let description = match tool_name {
        "Read" | "Write" | "Edit" => text_field(&input, "file_path").map(str::to_string),
        "Bash" => text_field(&input, "command").map(|c| truncate_chars(c, COMMAND_DESCRIPTION_MAX)),
        "Glob" | "Grep" => text_field(&input, "pattern").map(str::to_string),
        _ => None,
    };

    match description {
        Some(description) => TaskDescription {
            description,
            ..TaskDescription::default()
        },
        None => fallback(),
    }
}

/// First `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Non-empty string value of `key`.
fn text_field<'a>(input: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    input
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_uses_command() {
        let d = describe("Bash", Some(r#"{"command":"ls -la"}"#), "Task");
        assert_eq!(d.description, "ls -la");
        assert_eq!(d.subagent_type, None);
    }

    #[test]
    fn test_bash_command_is_truncated() {
        let long = "x".repeat(150);
        let input = serde_json::json!({ "command": long }).to_string();
        let d = describe("Bash", Some(&input), "Task");
        assert_eq!(d.description.chars().count(), 100);
    }

    #[test]
    fn test_delegation_metadata() {
        let input = r#"{"prompt":"Find all callers","subagent_type":"Explore","model":"haiku"}"#;
        let d = describe("Task", Some(input), "Task");
        assert_eq!(d.description, "Find all callers");
        assert_eq!(d.subagent_type.as_deref(), Some("Explore"));
        assert_eq!(d.subagent_model.as_deref(), Some("haiku"));

        let d = describe("Task", Some(r#"{"description":"Audit","prompt":"long"}"#), "Task");
        assert_eq!(d.description, "Audit");
    }

    #[test]
    fn test_delegation_tool_is_configurable() {
        let d = describe("Agent", Some(r#"{"description":"Review"}"#), "Agent");
        assert_eq!(d.description, "Review");
        let d = describe("Task", Some(r#"{"description":"Review"}"#), "Agent");
        assert_eq!(d.description, "Task");
    }

    #[test]
    fn test_file_and_pattern_tools() {
        assert_eq!(
            describe("Edit", Some(r#"{"file_path":"src/lib.rs"}"#), "Task").description,
            "src/lib.rs"
        );
        assert_eq!(
            describe("Grep", Some(r#"{"pattern":"fn main"}"#), "Task").description,
            "fn main"
        );
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(describe("Bash", Some("not json"), "Task").description, "Bash");
        assert_eq!(describe("Read", Some("{}"), "Task").description, "Read");
        assert_eq!(describe("WebFetch", Some(r#"{"url":"x"}"#), "Task").description, "WebFetch");
        assert_eq!(describe("Bash", None, "Task").description, "Bash");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
