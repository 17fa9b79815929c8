//! Command-line interface

use crate::config::{BackendKind, FailurePolicy, GeneratorConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Generate a standard set of symmetric and asymmetric keys
#[derive(Debug, Parser)]
#[command(name = "keybatch", version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand; `generate` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Options of the implicit `generate`
    #[command(flatten)]
    pub generate: GenerateArgs,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Wipe the output directory and generate every key
    Generate(GenerateArgs),
    /// Re-hash every file recorded in metadata and report mismatches
    Verify(VerifyArgs),
}

/// Options of `generate`
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Output directory [env: KEYBATCH_OUTPUT_DIR] [default: keys]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Key production backend
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendKind>,

    /// `openssl` executable for the openssl backend [env: KEYBATCH_OPENSSL]
    #[arg(long, value_name = "PATH")]
    pub openssl_bin: Option<PathBuf>,

    /// Run the remaining jobs after a failure
    #[arg(short, long)]
    pub keep_going: bool,

    /// Also write a plain-text meta.txt per key directory
    #[arg(long)]
    pub summary: bool,

    /// Record user, host and tool version in metadata
    #[arg(long)]
    pub with_environment: bool,
}

impl GenerateArgs {
    /// Override `config` with the flags that were given
    pub fn apply(self, config: &mut GeneratorConfig) {
        if let Some(dir) = self.output_dir {
            config.output_root = dir;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(program) = self.openssl_bin {
            config.openssl_bin = program;
        }
        if self.keep_going {
            config.failure_policy = FailurePolicy::Continue;
        }
        config.write_summary |= self.summary;
        config.record_environment |= self.with_environment;
    }
}

/// Options of `verify`
#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Output directory to verify [env: KEYBATCH_OUTPUT_DIR] [default: keys]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}
