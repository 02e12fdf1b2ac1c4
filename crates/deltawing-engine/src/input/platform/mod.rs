mod winit;

pub(crate) use self::winit::{map_button_action, map_key, map_key_action, map_mouse_button};
