//! Template rendering with Tera

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

/// Template renderer
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Create a new template renderer with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("index.html", include_str!("../templates/index.html")),
            (
                "components/hero.html",
                include_str!("../templates/components/hero.html"),
            ),
            (
                "components/loader.html",
                include_str!("../templates/components/loader.html"),
            ),
            (
                "components/error.html",
                include_str!("../templates/components/error.html"),
            ),
            (
                "components/answer.html",
                include_str!("../templates/components/answer.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with context
    pub fn render(&self, template: &str, context: &impl Serialize) -> Result<String> {
        let ctx = Context::from_serialize(context)?;
        Ok(self.tera.render(template, &ctx)?)
    }
}
