mod game;
mod player;
mod scenes;

use anyhow::Result;
use winit::dpi::LogicalSize;

use deltawing_engine::device::GpuInit;
use deltawing_engine::logging::{init_logging, LoggingConfig};
use deltawing_engine::window::{Runtime, RuntimeConfig};

use crate::game::Game;

const DISPLAY_WIDTH: u32 = 1280;
const DISPLAY_HEIGHT: u32 = 720;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    log::info!("starting DeltaWing {}", game::VERSION);

    let config = RuntimeConfig {
        title: "DeltaWing".to_string(),
        size: LogicalSize::new(DISPLAY_WIDTH, DISPLAY_HEIGHT),
        ..RuntimeConfig::default()
    };

    Runtime::run(config, GpuInit::default(), Game::new("assets"))
}
