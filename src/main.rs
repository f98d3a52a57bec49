//! Command-line entry point: `build_doc` renders the documentation,
//! `test_doc` runs the examples embedded in it.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use docbuild::builder::DocBuilder;
use docbuild::config::{BuildConfig, DEFAULT_OUTDIR};
use docbuild::doctest::DocTester;

#[derive(Parser)]
#[command(name = "docbuild")]
#[command(about = "Builds and tests HTML documentation from reStructuredText sources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build HTML documentation from the text files in the working directory
    #[command(name = "build_doc")]
    BuildDoc {
        /// Force regeneration even if no source files have changed
        #[arg(long)]
        force: bool,

        /// Skip the generation of API documentation
        #[arg(long)]
        without_apidocs: bool,

        /// Output directory for the API documentation
        #[arg(long, default_value = DEFAULT_OUTDIR)]
        outdir: PathBuf,
    },

    /// Run the examples embedded in the documentation as tests
    #[command(name = "test_doc")]
    TestDoc,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();
    let source_dir = std::env::current_dir()?;

    match cli.command {
        Commands::BuildDoc {
            force,
            without_apidocs,
            outdir,
        } => {
            let config = BuildConfig {
                force,
                without_apidocs,
                outdir,
            };
            let stats = DocBuilder::new(config, source_dir)?.build()?;
            log::info!(
                "built {} files, skipped {} ({:?})",
                stats.files_built,
                stats.files_skipped,
                stats.build_time
            );
            Ok(ExitCode::SUCCESS)
        }

        Commands::TestDoc => {
            let stats = DocTester::new(source_dir).run()?;
            if stats.failed() {
                println!(
                    "{} of {} examples failed",
                    stats.failures.len(),
                    stats.examples
                );
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
