//! Prompt templates for document QA

use std::collections::HashMap;

/// Template with `{{name}}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in the template with variables; unknown placeholders are left as-is
    ///
    /// Substitution is a single pass over the template, so placeholder syntax
    /// inside a substituted value is never expanded.
    #[must_use]
    pub fn render(&self, values: &HashMap<&str, &str>) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                rest = &rest[start..];
                break;
            };
            match values.get(after[..end].trim()) {
                Some(value) => result.push_str(value),
                None => result.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after[end + 2..];
        }
        result.push_str(rest);
        result
    }

    /// Get required variables
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

/// Extract variable names from template
fn extract_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            while let Some(&ch) = chars.peek() {
                chars.next();
                if ch == '}' {
                    if chars.peek() == Some(&'}') {
                        chars.next();
                        break;
                    }
                } else {
                    var_name.push(ch);
                }
            }
            let var_name = var_name.trim().to_string();
            if !var_name.is_empty() && !variables.contains(&var_name) {
                variables.push(var_name);
            }
        }
    }

    variables
}

/// Prompts used by the answer pipeline
pub struct RagPrompts;

impl RagPrompts {
    /// Question answering over retrieved document chunks
    #[must_use]
    pub fn document_qa() -> PromptTemplate {
        PromptTemplate::new(
            "You just need to answer the question based on the following context.\n QUESTIONS : {{question}}\n CONTEXT : {{context}}",
        )
    }

    /// Render the QA prompt for a question and its assembled context
    #[must_use]
    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        let values = HashMap::from([("question", question), ("context", context)]);
        Self::document_qa().render(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_variables() {
        let template = PromptTemplate::new("Hello {{name}}, you are {{age}} years old. Bye {{name}}");
        assert_eq!(template.variables(), &["name", "age"]);
    }

    #[test]
    fn test_template_render() {
        let template = PromptTemplate::new("Hello {{name}}! {{missing}}");
        let values = HashMap::from([("name", "Alice")]);
        assert_eq!(template.render(&values), "Hello Alice! {{missing}}");
    }

    #[test]
    fn test_placeholders_in_values_are_not_expanded() {
        let prompt = RagPrompts::build_qa_prompt("What does {{context}} mean?", "secret chunk");
        assert!(prompt.contains("QUESTIONS : What does {{context}} mean?"));
        assert_eq!(prompt.matches("secret chunk").count(), 1);
    }

    #[test]
    fn test_unterminated_placeholder_is_kept() {
        let template = PromptTemplate::new("Hi {{name}}, see {{oops");
        let values = HashMap::from([("name", "Bob")]);
        assert_eq!(template.render(&values), "Hi Bob, see {{oops");
    }

    #[test]
    fn test_document_qa_prompt() {
        let template = RagPrompts::document_qa();
        assert_eq!(template.variables(), &["question", "context"]);

        let prompt = RagPrompts::build_qa_prompt("Who signed?", "[Chunk 1]\nAlice signed.\n");
        assert!(prompt.starts_with("You just need to answer the question"));
        assert!(prompt.contains("QUESTIONS : Who signed?"));
        assert!(prompt.contains("CONTEXT : [Chunk 1]\nAlice signed."));
    }
}
