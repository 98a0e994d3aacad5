use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use templatepress::cli::{Cli, Command};
use templatepress::{StampConfig, TemplateProcessor};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();

    info!("templatepress starting");

    let sink = |line: &str| println!("{}", line.dimmed());

    match cli.command {
        Command::Process {
            template_dir,
            output_dir,
            config,
            rename,
        } => {
            let config = StampConfig::load(&config)?;
            let processor = TemplateProcessor::new(&sink);
            let summary = processor.process(&template_dir, &output_dir, &config, rename).await?;
            println!(
                "{} Processed {} files into {} ({} renamed, {} failed)",
                "✓".green(),
                summary.processed,
                output_dir.display().to_string().cyan(),
                summary.renamed,
                summary.failed
            );
        }
        Command::Rename { directory, config } => {
            let config = StampConfig::load(&config)?;
            let processor = TemplateProcessor::new(&sink);
            let renamed = processor.rename_in_place(&directory, &config).await?;
            println!("{} Renamed {} files in {}", "✓".green(), renamed, directory.display());
        }
        Command::Rules { config } => {
            let config = StampConfig::load(&config)?;
            let rules = config.rename_rules();
            if rules.is_empty() {
                println!("No file renaming rules defined");
            } else {
                for rule in rules {
                    println!("{} {} {}", rule.pattern.yellow(), "->".dimmed(), rule.replacement.cyan());
                }
            }
        }
    }

    Ok(())
}
