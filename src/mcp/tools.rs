//! MCP tool definitions for webvisit.

use super::protocol::Tool;
use serde_json::json;

/// Name of the visit tool.
pub const VISIT_TOOL: &str = "visit";

/// Get all available tools.
pub fn get_tools() -> Vec<Tool> {
    vec![Tool {
        name: VISIT_TOOL.to_string(),
        description: "Visit webpage(s) and return the summary of the content.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": ["string", "array"],
                    "items": {
                        "type": "string"
                    },
                    "minItems": 1,
                    "description": "The URL(s) of the webpage(s) to visit. Can be a single URL or an array of URLs."
                },
                "goal": {
                    "type": "string",
                    "description": "The goal of the visit for webpage(s)."
                }
            },
            "required": ["url", "goal"]
        }),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_schema_requires_url_and_goal() {
        let tools = get_tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, VISIT_TOOL);
        assert_eq!(tools[0].input_schema["required"], json!(["url", "goal"]));
        assert_eq!(tools[0].input_schema["properties"]["url"]["minItems"], 1);
    }
}
