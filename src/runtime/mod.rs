use std::env;
use std::time::Duration;

use clap::Parser;

use crate::audio::RodioOutput;
use crate::cli::Args;
use crate::library::{Downloader, Library};
use crate::player::Player;
use crate::server::{ApiServer, ControlHandle};

mod controller;
mod settings;
mod startup;

pub use controller::Controller;

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .filter_module("tiny_http", log::LevelFilter::Warn)
        .format_timestamp_millis()
        .init();
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbosity);
    log::debug!("command-line args: {args:?}");

    let settings = settings::load_settings(&args);
    if args.dump_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    let cwd = env::current_dir()?;
    let dir = startup::music_dir(settings.library.dir.as_deref(), &cwd)?;
    let library = Library::open(&dir, settings.library.clone());
    if library.is_empty() {
        log::warn!("no music files found in {}", library.root().display());
    }

    let tick = Duration::from_millis(settings.audio.tick_ms);
    let request_timeout = Duration::from_millis(settings.server.request_timeout_ms);

    // Without an audio device the API still answers, reporting the player as unavailable.
    let control = match RodioOutput::spawn(settings.audio.clone()) {
        Ok(output) => {
            let player = Player::new(
                output,
                startup::initial_volume(&settings.playback),
                startup::loop_mode(settings.playback.loop_mode),
            );
            let controller = Controller::new(player, library, settings.search.max_results);
            let (handle, _join) = controller.spawn(tick, request_timeout);
            handle
        }
        Err(e) => {
            log::error!("failed to open audio output: {e}");
            ControlHandle::detached()
        }
    };

    let downloader = Downloader::new(settings.download.clone(), &dir);
    ApiServer::new(settings.server.clone(), control, downloader)
        .run()
        .map_err(|e| -> Box<dyn std::error::Error> { e })
}
