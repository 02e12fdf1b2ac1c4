use crate::input::{ButtonAction, Key, KeyAction, MouseButton};

use super::ctx::{Frame, Graphics};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`Runtime`](crate::window::Runtime).
///
/// `tick` runs at a fixed rate; `render` runs once per frame, after the
/// frame's ticks, with `frame.partial_ticks()` for interpolation.
pub trait App {
    /// Called once the window and GPU exist, before the first tick.
    fn init(&mut self, gfx: &mut Graphics<'_>) -> anyhow::Result<()>;

    /// Advances the simulation by one fixed tick.
    fn tick(&mut self, gfx: &mut Graphics<'_>) -> AppControl;

    fn render(&mut self, frame: &mut Frame<'_>);

    fn on_key(&mut self, gfx: &mut Graphics<'_>, key: Key, action: KeyAction) -> AppControl {
        let _ = (gfx, key, action);
        AppControl::Continue
    }

    /// Mouse button event at `(x, y)` in window pixels.
    fn on_click(
        &mut self,
        gfx: &mut Graphics<'_>,
        button: MouseButton,
        action: ButtonAction,
        x: f32,
        y: f32,
    ) -> AppControl {
        let _ = (gfx, button, action, x, y);
        AppControl::Continue
    }

    /// Called once when the event loop is shutting down.
    fn exit(&mut self) {}
}
