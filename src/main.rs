//! RAX content store - admin entry point
//!
//! Runs one storage command against the configured root and prints the
//! result as JSON.

use log::{error, info};
use std::env;
use std::process::ExitCode;

use rax_content_store::commands::{handle_command, parse_command};
use rax_content_store::utils::logging::setup_logging;
use rax_content_store::{ContentStore, StoreConfig};

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let config = match StoreConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = match ContentStore::new(config) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open storage root: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = env::args().skip(1).collect();
    let result = handle_command(&store, parse_command(args.as_slice())).await;

    match serde_json::to_string_pretty(&result.body) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => error!("Failed to render result: {}", e),
    }

    if result.is_success() {
        info!("Command completed");
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
