use pingora::services::listening::Service;
use pingora_core::server::{configuration::Opt, Server};
use sentry::IntoDsn;

use grubdash::{
    api::OrdersHttpApp,
    config::{Config, Grubdash},
    core::status,
    logging::Logger,
    orders::{OrderStore, UuidIdGenerator},
    service::status::StatusHttpApp,
};

fn main() {
    // Read command-line arguments and configuration
    let cli_options = Opt::parse_args();
    let config = match Config::load_yaml_with_opt_override(&cli_options) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging
    let logger = if let Some(log_cfg) = &config.grubdash.log {
        let logger = Logger::new(log_cfg.clone());
        logger.init_env_logger();
        Some(logger)
    } else {
        env_logger::init();
        None
    };

    // The store lives as long as the orders service that owns it
    let seeded = config.orders.len();
    let store = OrderStore::with_orders(config.orders, Box::new(UuidIdGenerator));

    log::info!("Adding orders service...");
    let orders_service = match OrdersHttpApp::orders_http_service(&config.grubdash, store) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Failed to add listeners: {e}");
            std::process::exit(1);
        }
    };
    status::mark_ready(seeded);

    let mut grubdash_server = Server::new_with_opt_and_conf(Some(cli_options), config.pingora);

    // Add log service
    if let Some(log_service) = logger {
        log::info!("Adding log sync service...");
        grubdash_server.add_service(log_service);
    }

    add_optional_services(&mut grubdash_server, &config.grubdash);

    log::info!("Bootstrapping...");
    grubdash_server.bootstrap();
    log::info!("Bootstrapped. Adding Services...");
    grubdash_server.add_service(orders_service);

    log::info!("Starting Server...");
    grubdash_server.run_forever();
}

/// Add optional services (Sentry, Status, Prometheus)
fn add_optional_services(server: &mut Server, cfg: &Grubdash) {
    if let Some(sentry_cfg) = &cfg.sentry {
        log::info!("Adding Sentry config...");
        match sentry_cfg.dsn.clone().into_dsn() {
            Ok(Some(dsn)) => {
                server.sentry = Some(sentry::ClientOptions {
                    dsn: Some(dsn),
                    ..Default::default()
                });
            }
            Ok(None) => log::warn!("Sentry DSN is empty, Sentry disabled."),
            Err(e) => log::error!("Error parsing Sentry DSN: {e}"),
        }
    }

    if let Some(status_cfg) = &cfg.status {
        log::info!("Adding Status HTTP...");
        server.add_service(StatusHttpApp::status_http_service(status_cfg));
    }

    if let Some(prometheus_cfg) = &cfg.prometheus {
        log::info!("Adding Prometheus HTTP...");
        let mut prometheus_service_http = Service::prometheus_http_service();
        prometheus_service_http.add_tcp(&prometheus_cfg.address.to_string());
        server.add_service(prometheus_service_http);
    }
}
