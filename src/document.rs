//! Source documents and the incremental rebuild decision.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use glob::glob;
use log::debug;

/// A source text file with its derived output path.
#[derive(Debug, Clone)]
pub struct Document {
    /// Path of the `.txt` source file
    pub source_path: PathBuf,
    /// Path of the generated HTML file, beside the source
    pub output_path: PathBuf,
    /// Source modification time, read at discovery
    pub source_mtime: SystemTime,
}

impl Document {
    pub fn from_source(source_path: PathBuf) -> Result<Self> {
        let metadata = fs::metadata(&source_path)
            .with_context(|| format!("failed to stat source file: {}", source_path.display()))?;
        let source_mtime = metadata
            .modified()
            .with_context(|| format!("no modification time for: {}", source_path.display()))?;

        let mut output_path = source_path.clone();
        output_path.set_extension("html");

        Ok(Self {
            source_path,
            output_path,
            source_mtime,
        })
    }

    /// Decide whether the output must be (re)generated: yes if `force` is
    /// set, the output does not exist, or the output is strictly older than
    /// the source. Equal timestamps count as up to date.
    pub fn needs_rebuild(&self, force: bool) -> bool {
        if force {
            return true;
        }
        match fs::metadata(&self.output_path).and_then(|metadata| metadata.modified()) {
            Ok(output_mtime) => output_mtime < self.source_mtime,
            Err(_) => true,
        }
    }

    /// Source file name for progress reporting.
    pub fn source_name(&self) -> String {
        file_name(&self.source_path)
    }

    /// Output file name for progress reporting.
    pub fn output_name(&self) -> String {
        file_name(&self.output_path)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Discover every `*.txt` document directly inside `dir`, sorted by file
/// name so processing order is deterministic.
pub fn discover(dir: &Path) -> Result<Vec<Document>> {
    let pattern = dir.join("*.txt");
    let pattern = pattern
        .to_str()
        .with_context(|| format!("source directory path is not valid UTF-8: {}", dir.display()))?;

    let mut documents = Vec::new();
    for entry in glob(pattern).context("invalid document glob pattern")? {
        let path = entry.context("failed to read a discovered document path")?;
        documents.push(Document::from_source(path)?);
    }
    documents.sort_by(|a, b| a.source_path.cmp(&b.source_path));

    debug!("discovered {} documents in {}", documents.len(), dir.display());
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(path: &Path, mtime: SystemTime) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(mtime).unwrap();
    }

    #[test]
    fn output_path_replaces_extension() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("intro.txt");
        fs::write(&source, "Intro\n=====\n").unwrap();

        let doc = Document::from_source(source).unwrap();
        assert_eq!(doc.output_path, dir.path().join("intro.html"));
        assert_eq!(doc.output_name(), "intro.html");
    }

    #[test]
    fn missing_output_needs_rebuild() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("intro.txt");
        fs::write(&source, "text").unwrap();

        let doc = Document::from_source(source).unwrap();
        assert!(doc.needs_rebuild(false));
    }

    #[test]
    fn newer_output_is_up_to_date() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("intro.txt");
        fs::write(&source, "text").unwrap();
        fs::write(dir.path().join("intro.html"), "html").unwrap();

        let doc = Document::from_source(source).unwrap();
        touch(&doc.output_path, doc.source_mtime + Duration::from_secs(10));

        assert!(!doc.needs_rebuild(false));
    }

    #[test]
    fn older_output_is_stale() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("intro.txt");
        fs::write(&source, "text").unwrap();
        fs::write(dir.path().join("intro.html"), "html").unwrap();

        let doc = Document::from_source(source).unwrap();
        touch(&doc.output_path, doc.source_mtime - Duration::from_secs(10));

        assert!(doc.needs_rebuild(false));
    }

    #[test]
    fn equal_mtimes_count_as_up_to_date() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("intro.txt");
        fs::write(&source, "text").unwrap();
        fs::write(dir.path().join("intro.html"), "html").unwrap();

        let doc = Document::from_source(source).unwrap();
        touch(&doc.output_path, doc.source_mtime);

        assert!(!doc.needs_rebuild(false));
    }

    #[test]
    fn force_overrides_fresh_output() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("intro.txt");
        fs::write(&source, "text").unwrap();
        fs::write(dir.path().join("intro.html"), "html").unwrap();

        let doc = Document::from_source(source).unwrap();
        touch(&doc.output_path, doc.source_mtime + Duration::from_secs(10));

        assert!(doc.needs_rebuild(true));
    }

    #[test]
    fn discover_finds_only_txt_files_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("notes.rst"), "rst").unwrap();
        fs::write(dir.path().join("readme.md"), "md").unwrap();

        let documents = discover(dir.path()).unwrap();
        let names: Vec<_> = documents.iter().map(|d| d.source_name()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }
}
