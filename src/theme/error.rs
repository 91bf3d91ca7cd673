//! Theme engine error types

use thiserror::Error;

/// Template-related errors
#[derive(Debug, Error)]
pub enum ThemeError {
    /// A view's template is not among the loaded templates
    #[error("Template not found: {0}")]
    MissingTemplate(String),

    /// Template parsing or rendering error
    #[error("Template error: {0}")]
    TemplateError(String),

    /// Embedded template is not valid UTF-8
    #[error("Template {0} is not valid UTF-8")]
    Encoding(String),
}
