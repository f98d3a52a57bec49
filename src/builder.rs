//! The documentation build loop.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::apidoc::{self, ApiDocOutcome};
use crate::config::{BuildConfig, SiteConfig};
use crate::document::{self, Document};
use crate::highlight::{self, HighlightCapability};
use crate::parser::Parser;
use crate::renderer::HtmlRenderer;

/// Summary of one build run.
#[derive(Debug, Clone)]
pub struct BuildStats {
    pub files_built: usize,
    pub files_skipped: usize,
    pub apidocs: ApiDocOutcome,
    pub build_time: Duration,
}

pub struct DocBuilder {
    config: BuildConfig,
    site: SiteConfig,
    source_dir: PathBuf,
    parser: Parser,
    renderer: HtmlRenderer,
}

impl DocBuilder {
    /// Create a builder for the documents in `source_dir`. Loads
    /// `docbuild.ini` and registers the highlighting capability for the
    /// rest of the process; its absence is announced but never fatal.
    pub fn new(config: BuildConfig, source_dir: PathBuf) -> Result<Self> {
        let site = SiteConfig::load(&source_dir)?;

        if highlight::register(&site.highlight_theme) == HighlightCapability::Disabled {
            println!("syntax highlighting unavailable, code blocks will be rendered as plain text");
        }

        Ok(Self {
            config,
            site,
            source_dir,
            parser: Parser::new()?,
            renderer: HtmlRenderer::new(),
        })
    }

    /// Regenerate every stale document, then generate API documentation
    /// unless it is disabled.
    pub fn build(&self) -> Result<BuildStats> {
        let start_time = Instant::now();

        let documents = document::discover(&self.source_dir)?;
        info!(
            "discovered {} documents in {}",
            documents.len(),
            self.source_dir.display()
        );

        let mut files_built = 0;
        let mut files_skipped = 0;
        for doc in &documents {
            if doc.needs_rebuild(self.config.force) {
                println!("building documentation file {}", doc.output_name());
                self.build_document(doc)?;
                files_built += 1;
            } else {
                debug!("{} is up to date", doc.output_name());
                files_skipped += 1;
            }
        }

        let apidocs = if self.config.without_apidocs {
            debug!("API documentation generation disabled");
            ApiDocOutcome::Skipped
        } else {
            apidoc::generate(&self.source_dir, &self.site.apidoc_command, &self.config.outdir)?
        };

        Ok(BuildStats {
            files_built,
            files_skipped,
            apidocs,
            build_time: start_time.elapsed(),
        })
    }

    fn build_document(&self, doc: &Document) -> Result<()> {
        let content = fs::read_to_string(&doc.source_path)
            .with_context(|| format!("failed to read source file: {}", doc.source_path.display()))?;

        let parsed = self.parser.parse(&content);
        let body = self.renderer.render_body(&parsed);
        let page = self.render_full_html(&parsed.title, &body);

        fs::write(&doc.output_path, page)
            .with_context(|| format!("failed to write output file: {}", doc.output_path.display()))?;

        Ok(())
    }

    /// Wrap a rendered body in a full HTML page.
    fn render_full_html(&self, title: &str, body: &str) -> String {
        let stylesheet = self
            .site
            .stylesheet
            .as_deref()
            .map(|href| format!("\n    <link rel=\"stylesheet\" href=\"{}\" />", href))
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html lang="{}">
<head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{}</title>{}
</head>
<body>
{}</body>
</html>
"#,
            self.site.language,
            html_escape::encode_text(title),
            stylesheet,
            body
        )
    }
}
