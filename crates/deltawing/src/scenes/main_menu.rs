use deltawing_engine::core::{Frame, Graphics};
use deltawing_engine::input::{Key, KeyAction};

use super::{Scene, SceneControl, World};
use crate::game::{Text, VERSION};

const TITLE: &str = "DeltaWing";
const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const WHITE: [f32; 4] = [1.0; 4];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MenuItem {
    Play,
    Exit,
}

impl MenuItem {
    const ALL: [MenuItem; 2] = [MenuItem::Play, MenuItem::Exit];

    fn label(self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Exit => "Exit",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Play => 0,
            Self::Exit => 1,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct MainMenu {
    selection: MenuItem,
    title_width: f32,
}

impl MainMenu {
    pub fn new() -> Self {
        Self { selection: MenuItem::Play, title_width: 0.0 }
    }

    pub fn selection(&self) -> MenuItem {
        self.selection
    }
}

impl Scene for MainMenu {
    fn name(&self) -> &'static str {
        "main menu"
    }

    fn init(&mut self, _gfx: &mut Graphics<'_>, text: &Text) -> anyhow::Result<()> {
        self.title_width = text.string_width(TITLE);
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>, text: &mut Text) {
        let (w, h) = frame.context.size();
        let (w, h) = (w as f32, h as f32);
        let line = text.line_height();
        let mid = h / 2.0;

        text.bind(frame.context);
        // Draw failures are logged where they occur; the menu keeps going.
        text.set_color(RED);
        let _ = text.draw_string(frame, TITLE, w / 2.0 - self.title_width / 2.0, mid - line);

        text.set_color(WHITE);
        let _ = text.draw_string(frame, VERSION, 2.0, h - line - 2.0);
        let cursor_row = self.selection().index() as f32 + 1.0;
        let _ = text.draw_string(frame, ">", 1.0, mid + line * cursor_row);
        for item in MenuItem::ALL {
            let row = item.index() as f32 + 1.0;
            let _ = text.draw_string(frame, item.label(), 14.0, mid + line * row);
        }
    }

    fn on_key(&mut self, key: Key, action: KeyAction) -> SceneControl {
        if action != KeyAction::Press {
            return SceneControl::Continue;
        }
        match key {
            Key::W | Key::ArrowUp => self.selection = self.selection.prev(),
            Key::S | Key::ArrowDown => self.selection = self.selection.next(),
            Key::Enter => {
                return match self.selection {
                    MenuItem::Play => SceneControl::Switch(Box::new(World::new())),
                    MenuItem::Exit => SceneControl::Exit,
                };
            }
            _ => {}
        }
        SceneControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(menu: &mut MainMenu, key: Key) -> SceneControl {
        menu.on_key(key, KeyAction::Press)
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut menu = MainMenu::new();
        assert_eq!(menu.selection(), MenuItem::Play);

        press(&mut menu, Key::W);
        assert_eq!(menu.selection(), MenuItem::Exit);
        press(&mut menu, Key::ArrowDown);
        assert_eq!(menu.selection(), MenuItem::Play);
        press(&mut menu, Key::S);
        press(&mut menu, Key::S);
        assert_eq!(menu.selection(), MenuItem::Play);
        press(&mut menu, Key::ArrowUp);
        assert_eq!(menu.selection(), MenuItem::Exit);
    }

    #[test]
    fn only_presses_move_the_cursor() {
        let mut menu = MainMenu::new();
        menu.on_key(Key::S, KeyAction::Release);
        menu.on_key(Key::S, KeyAction::Repeat);
        assert_eq!(menu.selection(), MenuItem::Play);
    }

    #[test]
    fn enter_activates_the_selection() {
        let mut menu = MainMenu::new();
        assert!(matches!(press(&mut menu, Key::Enter), SceneControl::Switch(_)));

        press(&mut menu, Key::S);
        assert!(matches!(press(&mut menu, Key::Enter), SceneControl::Exit));
    }

    #[test]
    fn other_keys_do_nothing() {
        let mut menu = MainMenu::new();
        assert!(matches!(press(&mut menu, Key::Space), SceneControl::Continue));
        assert_eq!(menu.selection(), MenuItem::Play);
    }
}
