use consul_registrar::{Config, Registrar, RunningService};
use envconfig::Envconfig;
use lifecycle::SignalTermination;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::init_from_env().expect("failed to load configuration from env");

    // Subscribe before registering: a signal that lands during startup is buffered
    // and handled once the shutdown task is armed.
    let termination = SignalTermination::install().expect("failed to install signal handlers");

    let registrar = match Registrar::connect(&config.agent) {
        Ok(registrar) => registrar,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let service =
        match RunningService::start(registrar, &config.service_settings(), termination).await {
            Ok(service) => service,
            Err(e) => {
                error!("failed to start service: {}", e);
                std::process::exit(1);
            }
        };

    info!(instance_id = %service.instance_id(), "waiting for termination signal");

    match service.wait().await {
        Ok(()) => info!("exiting"),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
