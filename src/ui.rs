//! Swagger UI page rendering.

use crate::error::Result;
use crate::openapi::OpenApiDocument;
use log::debug;
use minijinja::{context, Environment, Value};

/// The `.html` suffix turns on auto-escaping
const TEMPLATE_NAME: &str = "index.html";

const CDN: &str = "https://unpkg.com/swagger-ui-dist";

const UI_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8">
    <title>{{ title }}</title>
    <link rel="stylesheet" type="text/css" href="{{ styles_url }}" >
    <link rel="icon" type="image/png" href="{{ favicon32 }}" sizes="32x32" />
    <link rel="icon" type="image/png" href="{{ favicon16 }}" sizes="16x16" />
    <style>
      html
      {
        box-sizing: border-box;
        overflow: -moz-scrollbars-vertical;
        overflow-y: scroll;
      }
      *,
      *:before,
      *:after
      {
        box-sizing: inherit;
      }
      body
      {
        margin:0;
        background: #fafafa;
      }
    </style>
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="{{ bundle_url }}"> </script>
    <script src="{{ preset_url }}"> </script>
    <script>
    window.onload = function() {
      const ui = SwaggerUIBundle({
        spec: {{ spec }},
        dom_id: '#swagger-ui',
        deepLinking: true,
        presets: [
          SwaggerUIBundle.presets.apis,
          SwaggerUIStandalonePreset
        ],
        plugins: [
          SwaggerUIBundle.plugins.DownloadUrl
        ],
        layout: "StandaloneLayout"
      })
      window.ui = ui
    }
  </script>
  </body>
</html>
"#;

/// Content of the Swagger UI page.
///
/// Assets default to the latest `swagger-ui-dist` release on the unpkg CDN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiOptions {
    /// Title of the HTML document
    pub title: String,
    /// URL of a 32x32 PNG favicon
    pub favicon32: String,
    /// URL of a 16x16 PNG favicon
    pub favicon16: String,
    /// URL of the Swagger UI bundle
    pub bundle_url: String,
    /// URL of the standalone preset bundle
    pub preset_url: String,
    /// URL of the Swagger UI stylesheet
    pub styles_url: String,
    /// Document as a JSON object literal
    pub spec: String,
}

impl UiOptions {
    /// Options titled after `app_name`, embedding `document` when given.
    ///
    /// Without a document, `spec` is left empty and must be filled before
    /// rendering.
    pub fn new(app_name: &str, document: Option<&OpenApiDocument>) -> Result<Self> {
        let spec = match document {
            Some(document) => serde_json::to_string(document)?,
            None => String::new(),
        };
        Ok(Self {
            title: format!("{} API Documentation", app_name),
            favicon32: format!("{}/favicon-32x32.png", CDN),
            favicon16: format!("{}/favicon-16x16.png", CDN),
            bundle_url: format!("{}/swagger-ui-bundle.js", CDN),
            preset_url: format!("{}/swagger-ui-standalone-preset.js", CDN),
            styles_url: format!("{}/swagger-ui.css", CDN),
            spec,
        })
    }

    /// Render the HTML page.
    ///
    /// Title and asset URLs are HTML-escaped. The document is inserted as is,
    /// except for `</` which would close the script element early.
    pub fn render(&self) -> Result<String> {
        debug!("Rendering documentation page: {}", self.title);
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, UI_TEMPLATE)?;
        let template = env.get_template(TEMPLATE_NAME)?;
        let page = template.render(context! {
            title => &self.title,
            favicon32 => &self.favicon32,
            favicon16 => &self.favicon16,
            bundle_url => &self.bundle_url,
            preset_url => &self.preset_url,
            styles_url => &self.styles_url,
            spec => Value::from_safe_string(self.spec.replace("</", "<\\/")),
        })?;
        Ok(page)
    }
}
