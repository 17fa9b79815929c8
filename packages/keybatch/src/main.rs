//! `keybatch` command-line entry point

use clap::Parser;
use keybatch::cli::{Cli, Commands, GenerateArgs, VerifyArgs};
use keybatch::{verify_tree, GeneratorConfig, KeyBatch};
use keybatch_common::LoggingTransformer;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    LoggingTransformer::init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Generate(args)) => generate(args),
        Some(Commands::Verify(args)) => verify(args),
        None => generate(cli.generate),
    }
}

fn generate(args: GenerateArgs) -> Result<(), Box<dyn Error>> {
    let mut config = GeneratorConfig::from_env();
    args.apply(&mut config);
    config.validate()?;

    let batch = KeyBatch::from_config(config);
    batch.generate()?;

    println!("Keys created successfully. See: {}", batch.log_path().display());
    Ok(())
}

fn verify(args: VerifyArgs) -> Result<(), Box<dyn Error>> {
    let root = args
        .output_dir
        .unwrap_or_else(|| GeneratorConfig::from_env().output_root);

    let report = verify_tree(&root)?;
    for problem in &report.problems {
        eprintln!("{problem}");
    }
    if !report.is_clean() {
        return Err(format!(
            "{} integrity problems below {}",
            report.problems.len(),
            root.display()
        )
        .into());
    }

    println!(
        "Verified {} files in {} key directories below {}",
        report.files_checked,
        report.directories.len(),
        root.display()
    );
    Ok(())
}
