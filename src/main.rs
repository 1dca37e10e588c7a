mod config;
mod gui;
mod player;
mod playlist;
mod presets;
mod storage;
mod store;
mod timer;
mod utils;
mod youtube;

use eframe::egui;
use log::{info, warn};
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::init();
    info!("Starting Focus DJ");

    // Load configuration
    let config = config::Config::load().expect("Failed to load configuration");

    let youtube = match config.youtube_api_key.clone() {
        Some(key) => Some(Arc::new(youtube::YouTubeClient::new(key))),
        None => {
            warn!("No YouTube API key configured; playlist loading is disabled");
            None
        }
    };

    // Initialize components
    let (player, commands) = player::PlayerHandle::new();
    let events = player::spawn_stub(commands);

    let store = store::Store::load(storage::Storage::at(config.storage_path()), player);
    let store = Arc::new(Mutex::new(store));
    store::spawn_event_pump(&store, events);

    // Create the GUI application
    let app = gui::FocusDjApp::new(store, config, youtube);

    // Run the GUI
    let options = eframe::NativeOptions {
        window_builder: Some(Box::new(|builder| {
            builder.with_inner_size(egui::vec2(1100.0, 720.0))
        })),
        ..Default::default()
    };

    eframe::run_native("Focus DJ", options, Box::new(|_cc| Box::new(app)))
}
