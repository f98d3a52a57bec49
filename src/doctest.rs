//! Runs the console examples embedded in documentation files.
//!
//! An example is a line starting with `$ ` anywhere in a document (normally
//! inside a literal block); the rest of the line is a shell command and the
//! following lines at the same indentation are its expected output. Expected
//! output may use `...` to match variable text.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use log::debug;

use crate::document;
use crate::matching;

/// One runnable example extracted from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub command: String,
    pub expected: String,
    /// 1-based line of the `$ ` marker
    pub line: usize,
}

/// A failed example, kept for the run report.
#[derive(Debug, Clone)]
pub struct ExampleFailure {
    pub file: PathBuf,
    pub line: usize,
    pub command: String,
    pub expected: String,
    pub actual: String,
}

/// Aggregate result of a test run.
#[derive(Debug, Default)]
pub struct TestStats {
    pub files: usize,
    pub examples: usize,
    pub failures: Vec<ExampleFailure>,
}

impl TestStats {
    pub fn failed(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub struct DocTester {
    source_dir: PathBuf,
}

impl DocTester {
    pub fn new(source_dir: PathBuf) -> Self {
        Self { source_dir }
    }

    /// Test every document in the source directory. A failing example is
    /// reported and recorded but never stops later examples or files.
    pub fn run(&self) -> Result<TestStats> {
        let documents = document::discover(&self.source_dir)?;
        let mut stats = TestStats::default();

        for doc in &documents {
            println!("testing documentation file {}", doc.source_name());
            stats.files += 1;
            self.test_file(&doc.source_path, &mut stats)?;
        }

        Ok(stats)
    }

    fn test_file(&self, path: &Path, stats: &mut TestStats) -> Result<()> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read documentation file: {}", path.display()))?;
        let examples = extract_examples(&content);
        debug!("{}: {} examples", path.display(), examples.len());

        for example in examples {
            stats.examples += 1;

            let output = Command::new("sh")
                .arg("-c")
                .arg(&example.command)
                .current_dir(&self.source_dir)
                .output()
                .with_context(|| format!("failed to run example command: {}", example.command))?;

            let mut actual = String::from_utf8_lossy(&output.stdout).into_owned();
            if !output.status.success() {
                actual.push_str(&String::from_utf8_lossy(&output.stderr));
            }
            let actual = matching::normalize_output(&actual);
            let expected = matching::normalize_output(&example.expected);

            let passed = output.status.success() && matching::output_matches(&expected, &actual);
            if !passed {
                let failure = ExampleFailure {
                    file: path.to_path_buf(),
                    line: example.line,
                    command: example.command,
                    expected,
                    actual,
                };
                report_failure(&failure);
                stats.failures.push(failure);
            }
        }

        Ok(())
    }
}

fn report_failure(failure: &ExampleFailure) {
    println!(
        "example failed at {}:{}",
        failure.file.display(),
        failure.line
    );
    println!("    command:  {}", failure.command);
    println!("    expected: {}", indent_continuation(&failure.expected));
    println!("    actual:   {}", indent_continuation(&failure.actual));
}

fn indent_continuation(text: &str) -> String {
    text.replace('\n', "\n              ")
}

/// Extract every `$ ` example from a document, with its expected output.
pub fn extract_examples(content: &str) -> Vec<Example> {
    let mut examples = Vec::new();
    let lines: Vec<&str> = content.lines().collect();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim_start();
        let Some(command) = trimmed.strip_prefix("$ ") else {
            i += 1;
            continue;
        };
        let indent = &line[..line.len() - trimmed.len()];
        let marker_line = i + 1;

        let mut expected = Vec::new();
        i += 1;
        while i < lines.len() {
            let next = lines[i];
            if next.trim().is_empty() || next.trim_start().starts_with("$ ") {
                break;
            }
            let Some(rest) = next.strip_prefix(indent) else {
                break;
            };
            expected.push(rest.to_string());
            i += 1;
        }

        examples.push(Example {
            command: command.trim().to_string(),
            expected: expected.join("\n"),
            line: marker_line,
        });
    }

    examples
}
