//! HTML rendering of workflow pages

use super::workflow::Page;
use crate::Result;
use tera::{Context, Tera};

/// Embedded templates
pub mod embedded {
    pub const INDEX_HTML: &str = include_str!("../../templates/index.html");
}

const INDEX_TEMPLATE: &str = "index.html";

/// Compiled page templates
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Compile the embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(INDEX_TEMPLATE, embedded::INDEX_HTML)?;
        // The records blob is embedded in an attribute, so keep escaping on
        tera.autoescape_on(vec![".html"]);
        Ok(Self { tera })
    }

    /// Render a workflow page
    pub fn render(&self, page: &Page) -> Result<String> {
        let mut context = Context::from_serialize(page)?;
        context.insert("repositories_json", &page.repositories.to_json()?);
        context.insert("has_error", &page.state.is_error());

        Ok(self.tera.render(INDEX_TEMPLATE, &context)?)
    }
}
