use crate::cli::Args;
use crate::config;

/// Load the config, falling back to defaults, then apply CLI overrides.
pub fn load_settings(args: &Args) -> config::Settings {
    let mut settings = match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                log::warn!("invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the player from starting.
            log::warn!("failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    };

    if let Some(host) = &args.host {
        settings.server.host = host.clone();
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(dir) = &args.dir {
        settings.library.dir = Some(dir.clone());
    }
    settings
}
