//! Build configuration.
//!
//! Two layers: [`BuildConfig`] carries the per-invocation flags supplied on
//! the command line, and [`SiteConfig`] carries the renderer and API-doc
//! settings read once from a `docbuild.ini` file beside the working
//! directory. Both are immutable for the duration of a run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ini::ini;
use log::debug;

use crate::error::BuildError;
use crate::highlight;

/// Renderer configuration file looked up beside the working directory.
pub const CONFIG_FILE: &str = "docbuild.ini";

/// Default output directory for generated API documentation.
pub const DEFAULT_OUTDIR: &str = "api-html";

/// Per-invocation build flags.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Regenerate every document even if its output is up to date
    pub force: bool,
    /// Skip the API documentation generation step entirely
    pub without_apidocs: bool,
    /// Output directory for API documentation
    pub outdir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            force: false,
            without_apidocs: false,
            outdir: PathBuf::from(DEFAULT_OUTDIR),
        }
    }
}

/// Settings read from `docbuild.ini`. Every key is optional; defaults apply
/// when the file or a key is absent.
///
/// ```ini
/// [html]
/// stylesheet = style.css
/// language = en
///
/// [highlight]
/// theme = InspiredGitHub
///
/// [apidoc]
/// command = epydoc
/// ```
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Stylesheet linked from every generated page
    pub stylesheet: Option<String>,
    /// Value of the `lang` attribute on generated pages
    pub language: String,
    /// Highlighting theme for code-block directives
    pub highlight_theme: String,
    /// Program invoked to generate API documentation
    pub apidoc_command: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            stylesheet: None,
            language: "en".to_string(),
            highlight_theme: highlight::DEFAULT_THEME.to_string(),
            apidoc_command: "epydoc".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load the configuration from `docbuild.ini` in `dir`, falling back to
    /// defaults when the file does not exist.
    pub fn load(dir: &Path) -> Result<Self, BuildError> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            debug!("{} not found, using default configuration", path.display());
            return Ok(Self::default());
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| BuildError::Config(format!("non-UTF-8 config path: {}", path.display())))?;
        let map = ini!(safe path_str).map_err(BuildError::Config)?;

        let mut config = Self::default();
        if let Some(value) = lookup(&map, "html", "stylesheet") {
            config.stylesheet = Some(value);
        }
        if let Some(value) = lookup(&map, "html", "language") {
            config.language = value;
        }
        if let Some(value) = lookup(&map, "highlight", "theme") {
            config.highlight_theme = value;
        }
        if let Some(value) = lookup(&map, "apidoc", "command") {
            config.apidoc_command = value;
        }

        debug!("loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Section and key names are lowercased by the INI parser.
fn lookup(
    map: &HashMap<String, HashMap<String, Option<String>>>,
    section: &str,
    key: &str,
) -> Option<String> {
    map.get(section).and_then(|entries| entries.get(key)).and_then(|value| value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig::load(dir.path()).unwrap();

        assert_eq!(config.stylesheet, None);
        assert_eq!(config.language, "en");
        assert_eq!(config.apidoc_command, "epydoc");
    }

    #[test]
    fn values_override_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[html]\nstylesheet = custom.css\nlanguage = de\n\n[apidoc]\ncommand = apigen\n",
        )
        .unwrap();

        let config = SiteConfig::load(dir.path()).unwrap();
        assert_eq!(config.stylesheet.as_deref(), Some("custom.css"));
        assert_eq!(config.language, "de");
        assert_eq!(config.apidoc_command, "apigen");
        // Untouched keys keep their defaults
        assert_eq!(config.highlight_theme, highlight::DEFAULT_THEME);
    }

    #[test]
    fn partial_sections_are_accepted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[highlight]\ntheme = Solarized (light)\n").unwrap();

        let config = SiteConfig::load(dir.path()).unwrap();
        assert_eq!(config.highlight_theme, "Solarized (light)");
        assert_eq!(config.language, "en");
    }
}
