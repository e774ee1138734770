use clap::Parser;
use env_logger::Env;
use log::{error, info};
use roster::configuration::config::{CliArgs, Config};
use roster::controller::controller_handler::Controller;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    let config = Config::from_args(&args);

    // RUST_LOG wins over the configured level
    let level = config
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_target(false)
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Unable to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Configuration loaded, database at {}",
        config.database_path.display()
    );

    let controller = Controller::new(config);
    if let Err(e) = controller.run().await {
        error!("Error occurred in the controller: {}, exiting...", e);
        std::process::exit(1);
    }
}
