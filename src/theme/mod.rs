//! Theme engine
//!
//! Templates live under `templates/` and are embedded into the binary. They
//! are all parsed once at startup; every [`View`] is checked to have a
//! template, so a broken or missing page fails the boot instead of a request.

use anyhow::Result;
use rust_embed::RustEmbed;
use std::error::Error as StdError;
use tera::{Context as TeraContext, Tera};

mod error;

pub use error::ThemeError;

/// Embedded page templates
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct TemplateAssets;

/// Every page the blog can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Paginated front page
    Home,
    /// Alternate listing with totals
    Articles,
    /// Single article with its comments
    Article,
    NewArticle,
    EditArticle,
    Register,
    Login,
}

impl View {
    pub const ALL: [View; 7] = [
        View::Home,
        View::Articles,
        View::Article,
        View::NewArticle,
        View::EditArticle,
        View::Register,
        View::Login,
    ];

    /// Template file backing this view
    pub fn template(self) -> &'static str {
        match self {
            View::Home => "index.html",
            View::Articles => "articles.html",
            View::Article => "article.html",
            View::NewArticle => "new_article.html",
            View::EditArticle => "edit_article.html",
            View::Register => "register.html",
            View::Login => "login.html",
        }
    }
}

/// Compiled templates, shared read-only across requests
pub struct ThemeEngine {
    tera: Tera,
}

impl ThemeEngine {
    /// Compile the templates embedded in the binary
    pub fn new() -> Result<Self> {
        let mut templates = Vec::new();
        for name in TemplateAssets::iter() {
            let Some(file) = TemplateAssets::get(&name) else {
                continue;
            };
            let content = String::from_utf8(file.data.into_owned())
                .map_err(|_| ThemeError::Encoding(name.to_string()))?;
            templates.push((name.to_string(), content));
        }

        Self::from_templates(templates)
    }

    /// Compile an explicit set of `(name, source)` templates
    pub fn from_templates<I, N, S>(templates: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, S)>,
        N: AsRef<str>,
        S: AsRef<str>,
    {
        let mut tera = Tera::default();

        let templates: Vec<(N, S)> = templates.into_iter().collect();
        tera.add_raw_templates(
            templates
                .iter()
                .map(|(name, source)| (name.as_ref(), source.as_ref())),
        )
        .map_err(|e| ThemeError::TemplateError(describe(&e)))?;

        for view in View::ALL {
            if !tera.get_template_names().any(|name| name == view.template()) {
                return Err(ThemeError::MissingTemplate(view.template().to_string()).into());
            }
        }

        tracing::debug!(
            "Loaded {} template(s)",
            tera.get_template_names().count()
        );

        Ok(Self { tera })
    }

    /// Render a view with the given context
    pub fn render(&self, view: View, context: &TeraContext) -> Result<String> {
        self.tera
            .render(view.template(), context)
            .map_err(|e| {
                ThemeError::TemplateError(format!(
                    "Failed to render '{}': {}",
                    view.template(),
                    describe(&e)
                ))
                .into()
            })
    }
}

/// Flatten a tera error and its causes into one line per cause
fn describe(e: &tera::Error) -> String {
    let mut msg = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        msg.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    msg
}

#[cfg(test)]
mod tests;
