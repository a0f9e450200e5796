use std::sync::Arc;

use vitrine::config::{load_config, schema_json};
use vitrine::startup::{build_state, run, Command};
use vitrine::utils::logger::init_logging;

const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// Split `--config <file>` off the arguments; `VITRINE_CONFIG` is the fallback.
fn config_path(args: &mut Vec<String>) -> String {
    if let Some(pos) = args.iter().position(|a| a == "--config") {
        if pos + 1 < args.len() {
            let path = args.remove(pos + 1);
            args.remove(pos);
            return path;
        }
    }
    std::env::var("VITRINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

#[tokio::main]
async fn main() {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let path = config_path(&mut args);

    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(usage) => {
            eprintln!("{}", usage);
            std::process::exit(2);
        }
    };

    if command == Command::PrintSchema {
        println!("{}", schema_json());
        return;
    }

    let config = match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration from {}: {}", path, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error initialising logging: {}", e);
        std::process::exit(1);
    }

    let state = match build_state(Arc::new(config)) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Error starting up: {}", e);
            std::process::exit(1);
        }
    };

    match run(&state, command).await {
        Ok(output) => println!("{}", output),
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    }
}
