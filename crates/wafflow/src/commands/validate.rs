use crate::utils;
use colored::Colorize;
use std::path::Path;

pub fn handle(file: &Path) -> anyhow::Result<()> {
    println!("{}", "Validating definition...".blue());

    let config = utils::load_definition(file)?;
    match wafflow_cloud_aws::validate_config(&config) {
        Ok(()) => {
            println!("{}", "✓ Definition is valid".green().bold());
            println!();
            utils::print_summary(&config);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", "✗ Invalid definition".red().bold());
            Err(e.into())
        }
    }
}
