use std::path::PathBuf;

use anyhow::Context as _;

use deltawing_engine::core::{App, AppControl, Frame, Graphics};
use deltawing_engine::input::{ButtonAction, Key, KeyAction, MouseButton};
use deltawing_engine::render::backend::wgpu_device::WgpuDevice;
use deltawing_engine::text::{load_font, TextRenderer};

use crate::scenes::{MainMenu, Scene, SceneControl};

pub const VERSION: &str = "v0.1";

const FONT_FILE: &str = "roboto_mono.fnt";
const FONT_SCALE: f32 = 0.5;

pub type Text = TextRenderer<WgpuDevice>;

/// Top-level game state: the shared text renderer and the active scene.
pub struct Game {
    asset_dir: PathBuf,
    text: Option<Text>,
    scene: Box<dyn Scene>,
}

impl Game {
    pub fn new(asset_dir: impl Into<PathBuf>) -> Self {
        Self { asset_dir: asset_dir.into(), text: None, scene: Box::new(MainMenu::new()) }
    }

    fn apply(&mut self, gfx: &mut Graphics<'_>, control: SceneControl) -> AppControl {
        match control {
            SceneControl::Continue => AppControl::Continue,
            SceneControl::Exit => AppControl::Exit,
            SceneControl::Switch(next) => self.switch(gfx, next),
        }
    }

    fn switch(&mut self, gfx: &mut Graphics<'_>, mut next: Box<dyn Scene>) -> AppControl {
        let Some(text) = self.text.as_ref() else {
            return AppControl::Continue;
        };
        self.scene.exit();
        if let Err(e) = next.init(gfx, text) {
            log::error!("failed to enter {}: {e:#}", next.name());
            return AppControl::Exit;
        }
        log::debug!("scene: {} -> {}", self.scene.name(), next.name());
        self.scene = next;
        AppControl::Continue
    }
}

impl App for Game {
    fn init(&mut self, gfx: &mut Graphics<'_>) -> anyhow::Result<()> {
        let font_path = self.asset_dir.join(FONT_FILE);
        let font = load_font(gfx.device, &font_path, &self.asset_dir)
            .with_context(|| format!("loading {}", font_path.display()))?;

        let mut text = TextRenderer::new(gfx.device, gfx.shaders, gfx.context, font)?;
        text.set_scale(FONT_SCALE);

        self.scene.init(gfx, &text)?;
        self.text = Some(text);
        Ok(())
    }

    fn tick(&mut self, gfx: &mut Graphics<'_>) -> AppControl {
        let control = self.scene.tick(gfx);
        self.apply(gfx, control)
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        if let Some(text) = self.text.as_mut() {
            self.scene.render(frame, text);
        }
    }

    fn on_key(&mut self, gfx: &mut Graphics<'_>, key: Key, action: KeyAction) -> AppControl {
        let control = self.scene.on_key(key, action);
        self.apply(gfx, control)
    }

    fn on_click(
        &mut self,
        gfx: &mut Graphics<'_>,
        button: MouseButton,
        action: ButtonAction,
        x: f32,
        y: f32,
    ) -> AppControl {
        let control = self.scene.on_click(button, action, x, y);
        self.apply(gfx, control)
    }

    fn exit(&mut self) {
        self.scene.exit();
    }
}
