use colored::Colorize;
use network_sync::config::{Config, DEFAULT_DUMP_FILE};
use network_sync::output::print_reports;
use network_sync::replay_dump;
use network_sync::sync::NetworkStateCache;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let config = Config::from_env()?;
    log4rs::init_file(&config.log_config, Default::default())
        .map_err(|e| format!("Error initializing log4rs from {}: {e}", config.log_config))?;

    log::info!("#Start main()");

    let dump_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DUMP_FILE.to_string());

    // Two cycles: the second one shows which networks settled
    let summary = replay_dump(&dump_file, &config, NetworkStateCache::global(), 2)?;
    print_reports(&summary.reports);

    for (owner, cidr) in &summary.next_cidr {
        println!("#{}# next network of '{owner}' gets {cidr}", "NOTE".on_blue());
    }

    Ok(())
}
