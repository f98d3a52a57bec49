//! External API-documentation generator step.
//!
//! The generator is an external program, probed by simply running it: a
//! NotFound spawn error means the capability is absent, which downgrades the
//! build instead of failing it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use log::{debug, info};

/// Generator configuration file, resolved beside the working directory.
pub const APIDOC_CONFIG: &str = "epydoc.config";

/// Stylesheet handed to the generator, resolved beside the working directory.
pub const APIDOC_STYLESHEET: &str = "epydoc.css";

/// What happened to the API-doc generation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiDocOutcome {
    /// The generator ran successfully
    Generated,
    /// The step was disabled by configuration
    Skipped,
    /// The generator program is not installed
    Unavailable,
}

/// Run the external generator once over the whole package. Generator
/// failures (nonzero exit) are hard errors; a missing program is a
/// capability downgrade.
pub fn generate(source_dir: &Path, command: &str, outdir: &Path) -> Result<ApiDocOutcome> {
    let config_path = absolute(source_dir, Path::new(APIDOC_CONFIG));
    let css_path = absolute(source_dir, Path::new(APIDOC_STYLESHEET));
    let output_dir = absolute(source_dir, outdir);

    debug!(
        "running API documentation generator: {} --config={} --css={} --output={}",
        command,
        config_path.display(),
        css_path.display(),
        output_dir.display()
    );

    let status = Command::new(command)
        .arg(format!("--config={}", config_path.display()))
        .arg(format!("--css={}", css_path.display()))
        .arg(format!("--output={}", output_dir.display()))
        .arg("--verbose")
        .current_dir(source_dir)
        .status();

    match status {
        Ok(status) if status.success() => {
            info!("API documentation written to {}", output_dir.display());
            Ok(ApiDocOutcome::Generated)
        }
        Ok(status) => bail!("API documentation generator '{}' failed: {}", command, status),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            println!("{} not installed, skipping API documentation", command);
            Ok(ApiDocOutcome::Unavailable)
        }
        Err(err) => Err(err)
            .with_context(|| format!("failed to run API documentation generator '{}'", command)),
    }
}

fn absolute(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_program_downgrades() {
        let dir = TempDir::new().unwrap();
        let outcome = generate(
            dir.path(),
            "docbuild-no-such-generator",
            Path::new("api-html"),
        )
        .unwrap();
        assert_eq!(outcome, ApiDocOutcome::Unavailable);
    }

    #[test]
    fn successful_program_reports_generated() {
        let dir = TempDir::new().unwrap();
        let outcome = generate(dir.path(), "true", Path::new("api-html")).unwrap();
        assert_eq!(outcome, ApiDocOutcome::Generated);
    }

    #[test]
    fn failing_program_is_a_hard_error() {
        let dir = TempDir::new().unwrap();
        let result = generate(dir.path(), "false", Path::new("api-html"));
        assert!(result.is_err());
    }
}
