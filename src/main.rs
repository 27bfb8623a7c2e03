use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use camera_shutter::app;
use camera_shutter::camera::V4lCamera;
use camera_shutter::gpio::Board;
use camera_shutter::storage::PhotoDir;
use camera_shutter::tone::Beeper;
use camera_shutter::{Config, Shutter};
use log::info;
use rppal::hal::Delay;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Program is starting...");

    let config = Config::default();
    let status = app::launch(|| Board::setup(&config.pins), |board| serve(board, &config));
    std::process::exit(status);
}

fn serve(board: Board, config: &Config) -> Result<(), Box<dyn Error>> {
    let (led, switch, beeper_pin) = board.into_parts();

    let photos = PhotoDir::new(&config.photo_dir);
    photos.prepare()?;

    let running = setup_signal_handler()?;

    let mut shutter = Shutter::new(
        led,
        switch,
        Beeper::new(beeper_pin, Delay::new()),
        V4lCamera::new(),
        photos,
        config.resolution,
    );
    shutter.run(&running, config.poll_interval)?;
    Ok(())
}

fn setup_signal_handler() -> Result<Arc<AtomicBool>, Box<dyn Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;
    Ok(running)
}
