//! Prompt templates for webvisit.
//!
//! The extractor prompt can be replaced by pointing `prompts.extractor_file`
//! at a text file using the same `{{webpage_content}}` and `{{goal}}` slots.

use std::collections::HashMap;

/// Built-in evidence extraction prompt.
pub const EXTRACTOR_PROMPT: &str = r#"Please process the following webpage content and user goal to extract relevant information:

## **Webpage Content**
{{webpage_content}}

## **User Goal**
{{goal}}

## **Task Guidelines**
1. **Content Scanning for Rational**: Locate the **specific sections/data** directly related to the user's goal within the webpage content
2. **Key Extraction for Evidence**: Identify and extract the **most relevant information** from the content, you never miss any important information, output the **full original context** of the content as far as possible, it can be more than three paragraphs.
3. **Summary Output for Summary**: Organize into a concise paragraph with logical flow, prioritizing clarity and judge the contribution of the information to the goal.

**Final Output Format using JSON format has "rational", "evidence", "summary" fields**
"#;

/// Collection of prompt templates.
#[derive(Debug, Clone)]
pub struct Prompts {
    pub extractor: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            extractor: EXTRACTOR_PROMPT.to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, replacing the extractor template when a file is given.
    pub fn load(extractor_file: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(path) = extractor_file {
            let path = shellexpand::tilde(path).to_string();
            prompts.extractor = std::fs::read_to_string(&path)?;
        }

        Ok(prompts)
    }

    /// Render the extractor prompt for one page and goal.
    pub fn render_extractor(&self, webpage_content: &str, goal: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("webpage_content".to_string(), webpage_content.to_string());
        vars.insert("goal".to_string(), goal.to_string());
        Self::render(&self.extractor, &vars)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Slots are filled in one left-to-right pass; inserted values are never
    /// rescanned, and unknown `{{name}}` slots are kept verbatim.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            result.push_str(&rest[..open]);
            let after_open = &rest[open + 2..];

            match after_open.find("}}") {
                Some(close) => match vars.get(&after_open[..close]) {
                    Some(value) => {
                        result.push_str(value);
                        rest = &after_open[close + 2..];
                    }
                    None => {
                        result.push_str("{{");
                        rest = after_open;
                    }
                },
                None => {
                    result.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }
}
