use thiserror::Error;

/// Token in the template that is replaced by the user's query.
pub const PLACEHOLDER: &str = "{query}";

/// Built-in instructional template. Contains `PLACEHOLDER` exactly once.
pub const META_PROMPT: &str = include_str!("../assets/meta_prompt.txt");

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template does not contain the {{query}} placeholder")]
    MissingPlaceholder,

    #[error("template contains {count} {{query}} placeholders, expected exactly one")]
    DuplicatePlaceholder { count: usize },
}

/// A template split around its single substitution point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaPrompt {
    prefix: String,
    suffix: String,
}

impl MetaPrompt {
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let count = template.matches(PLACEHOLDER).count();
        match count {
            0 => Err(TemplateError::MissingPlaceholder),
            1 => {
                let (prefix, suffix) = template
                    .split_once(PLACEHOLDER)
                    .ok_or(TemplateError::MissingPlaceholder)?;
                Ok(MetaPrompt {
                    prefix: prefix.to_string(),
                    suffix: suffix.to_string(),
                })
            }
            count => Err(TemplateError::DuplicatePlaceholder { count }),
        }
    }

    /// Insert `query` verbatim. The query itself is never scanned for placeholders.
    pub fn render(&self, query: &str) -> String {
        let mut out = String::with_capacity(self.prefix.len() + query.len() + self.suffix.len());
        out.push_str(&self.prefix);
        out.push_str(query);
        out.push_str(&self.suffix);
        out
    }
}

impl Default for MetaPrompt {
    fn default() -> Self {
        // META_PROMPT is a compiled-in asset with a single placeholder.
        let (prefix, suffix) = META_PROMPT.split_once(PLACEHOLDER).unwrap_or((META_PROMPT, ""));
        MetaPrompt {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }
}

/// One generation input, built fresh for each invocation.
#[derive(Debug, Clone)]
pub struct PromptRequest<'a> {
    pub template: &'a MetaPrompt,
    pub user_query: &'a str,
}

impl<'a> PromptRequest<'a> {
    pub fn new(template: &'a MetaPrompt, user_query: &'a str) -> Self {
        Self { template, user_query }
    }

    pub fn render(&self) -> String {
        self.template.render(self.user_query)
    }
}
