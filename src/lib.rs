//! Docbuild
//!
//! A documentation-build helper: renders the reStructuredText `*.txt` files
//! in a directory to HTML, regenerating only the stale ones, and runs the
//! console examples embedded in those files as tests.

pub mod apidoc;
pub mod builder;
pub mod config;
pub mod doctest;
pub mod document;
pub mod error;
pub mod highlight;
pub mod matching;
pub mod parser;
pub mod renderer;

pub use apidoc::ApiDocOutcome;
pub use builder::{BuildStats, DocBuilder};
pub use config::{BuildConfig, SiteConfig};
pub use doctest::{DocTester, ExampleFailure, TestStats};
pub use document::Document;
pub use error::BuildError;
pub use highlight::HighlightCapability;
pub use parser::{ParsedDocument, Parser, RstNode};
pub use renderer::HtmlRenderer;
