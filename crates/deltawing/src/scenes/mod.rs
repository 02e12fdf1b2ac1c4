//! Game scenes. Exactly one is active; switching calls `exit` on the old
//! scene and `init` on the new one.

mod main_menu;
mod world;

use deltawing_engine::core::{Frame, Graphics};
use deltawing_engine::input::{ButtonAction, Key, KeyAction, MouseButton};

use crate::game::Text;

pub use main_menu::MainMenu;
pub use world::World;

/// What the game loop should do after a scene callback.
pub enum SceneControl {
    Continue,
    /// Replace the active scene.
    Switch(Box<dyn Scene>),
    Exit,
}

pub trait Scene {
    fn name(&self) -> &'static str;

    /// Creates GPU resources. `text` is the shared font renderer, for layout.
    fn init(&mut self, gfx: &mut Graphics<'_>, text: &Text) -> anyhow::Result<()>;

    fn tick(&mut self, gfx: &mut Graphics<'_>) -> SceneControl {
        let _ = gfx;
        SceneControl::Continue
    }

    fn render(&mut self, frame: &mut Frame<'_>, text: &mut Text);

    fn exit(&mut self) {}

    fn on_key(&mut self, key: Key, action: KeyAction) -> SceneControl {
        let _ = (key, action);
        SceneControl::Continue
    }

    fn on_click(&mut self, button: MouseButton, action: ButtonAction, x: f32, y: f32) -> SceneControl {
        let _ = (button, action, x, y);
        SceneControl::Continue
    }
}
