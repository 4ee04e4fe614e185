//! Rule table validation CLI tool
//!
//! Validates a famlink CSV rule file and reports any errors.

use famlink_util::format_hmm;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: validate-rules <rule-file>");
            eprintln!();
            eprintln!("Validates a famlink CSV rule table.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-rules config.csv");
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Rule file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match famlink_config::load_rules(&config_path) {
        Ok(table) => {
            println!("✓ Rule table is valid");
            println!();
            println!("Summary:");
            println!("  Apps: {}", table.apps().len());
            println!("  Rules: {}", table.len());

            if !table.is_empty() {
                println!();
                println!("Rules:");
                for rule in table.rules() {
                    let limit_str = match rule.limit {
                        Some(limit) if limit.is_zero() => "blocked".to_string(),
                        Some(limit) => format!("max {}", format_hmm(limit)),
                        None => "unlimited".to_string(),
                    };
                    let window_str = match rule.window {
                        Some(window) => format!(", {}", window),
                        None => String::new(),
                    };
                    println!(
                        "  - {}: {} on {}{}",
                        rule.app, limit_str, rule.days, window_str
                    );
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Rule table validation failed");
            eprintln!();
            match &e {
                famlink_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                famlink_config::ConfigError::InvalidHeader => {
                    eprintln!(
                        "Missing or invalid header line (expected '{}')",
                        famlink_config::HEADER
                    );
                }
                famlink_config::ConfigError::BadRow { line, message } => {
                    eprintln!("Malformed row on line {}: {}", line, message);
                }
                famlink_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
            }
            ExitCode::from(1)
        }
    }
}
