//! Server startup utilities.

use pricegate_config::AppConfig;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
    ____       _                        __
   / __ \_____(_)_______  ____ _____ _/ /____
  / /_/ / ___/ / ___/ _ \/ __ `/ __ `/ __/ _ \
 / ____/ /  / / /__/  __/ /_/ / /_/ / /_/  __/
/_/   /_/  /_/\___/\___/\__, /\__,_/\__/\___/
                       /____/
    "#);
}

/// Prints server startup information.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    let addr = config.server.addr();
    info!("{}", separator);
    info!("Environment: {}", config.app.environment);
    info!("REST API:    http://{}", addr);
    info!("Health:      http://{}/health", addr);
    info!("API Docs:    http://{}/swagger-ui", addr);
    info!("Cache:       {}", config.cache.backend);
    info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_banner_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_banner();
    }

    #[test]
    fn test_print_startup_info_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_startup_info(&AppConfig::default());
    }
}
