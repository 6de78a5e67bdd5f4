//! Chat prompt template.
//!
//! Renders a system message and the user's question into the single prompt
//! string sent to the model backend.

/// Two-message prompt template: a system instruction plus a user question.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system: String,
}

impl PromptTemplate {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
        }
    }

    /// Render the full prompt for one question.
    pub fn render(&self, question: &str) -> String {
        format!("{}\n\nQuestion: {}", self.system, question)
    }
}
