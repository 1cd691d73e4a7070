//! gridsynth - play the engine from the terminal
//!
//! Run with: cargo run
//! Set GRIDSYNTH_LOG=<file> to capture engine logs.

mod app;
mod ui;

use std::{fs::File, sync::Mutex};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use gridsynth::{io::CpalProvider, Engine, EngineConfig};

use app::App;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    let mut engine = Engine::new(EngineConfig::default(), CpalProvider);
    let polyphony = engine.config().polyphony;
    engine.init_voices(polyphony);

    let mut terminal = ratatui::init();
    let result = App::new(engine).run(&mut terminal);
    ratatui::restore();
    result
}

// The TUI owns stdout, so logs only go to a file when asked for.
fn init_logging() -> EyreResult<()> {
    let Ok(path) = std::env::var("GRIDSYNTH_LOG") else {
        return Ok(());
    };
    let file = File::create(&path).wrap_err_with(|| format!("failed to create log file {path}"))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    Ok(())
}
