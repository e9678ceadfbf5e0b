//! Config validation CLI tool
//!
//! Validates a carrel configuration file and reports any errors.

use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: validate-config <config-file>");
            eprintln!();
            eprintln!("Validates a carrel configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config carrel.toml");
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match carrel_config::load_config(&config_path) {
        Ok(policy) => {
            let facility = &policy.facility;
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", carrel_config::CURRENT_CONFIG_VERSION);
            println!("  Seats: {}", policy.seat_count);
            println!("  Max name length: {}", policy.max_name_length);
            if facility.is_24h() {
                println!("  Hours: open 24 hours");
            } else {
                println!("  Hours: {} - {}", facility.open(), facility.close());
            }
            println!(
                "  Session: {} min, renewable in the last {} min",
                facility.max_session_minutes(),
                facility.max_renew_lead_minutes()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                carrel_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                carrel_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                carrel_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                carrel_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        carrel_config::CURRENT_CONFIG_VERSION
                    );
                }
                carrel_config::ConfigError::Invalid(err) => {
                    eprintln!("  {}", err);
                }
            }
            ExitCode::from(1)
        }
    }
}
