use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::config::key::{Key, KeyBinding};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub suspend: KeyBinding,
    pub theme: KeyBinding,
    pub back: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationKeybindings {
    pub up: KeyBinding,
    pub down: KeyBinding,
    pub page_up: KeyBinding,
    pub page_down: KeyBinding,
    pub home: KeyBinding,
    pub end: KeyBinding,
    pub select: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiaryKeybindings {
    pub new: KeyBinding,
    pub delete: KeyBinding,
    pub reload: KeyBinding,
    pub login: KeyBinding,
    pub logout: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryKeybindings {
    pub edit: KeyBinding,
    pub add_retrospect: KeyBinding,
    pub delete_retrospect: KeyBinding,
    pub reload: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogKeybindings {
    pub confirm: KeyBinding,
    pub cancel: KeyBinding,
    pub dismiss: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub navigation: NavigationKeybindings,
    pub diary: DiaryKeybindings,
    pub entry: EntryKeybindings,
    pub dialog: DialogKeybindings,
}

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::new(KeyCode::Char('q')).into(),
            suspend: Key::with_ctrl(KeyCode::Char('z')).into(),
            theme: Key::new(KeyCode::Char('t')).into(),
            back: Key::new(KeyCode::Esc).into(),
        }
    }
}

impl Default for NavigationKeybindings {
    fn default() -> Self {
        Self {
            up: KeyBinding::multiple(vec![Key::new(KeyCode::Char('k')), Key::new(KeyCode::Up)]),
            down: KeyBinding::multiple(vec![Key::new(KeyCode::Char('j')), Key::new(KeyCode::Down)]),
            page_up: Key::new(KeyCode::PageUp).into(),
            page_down: Key::new(KeyCode::PageDown).into(),
            home: KeyBinding::multiple(vec![Key::new(KeyCode::Char('g')), Key::new(KeyCode::Home)]),
            end: KeyBinding::multiple(vec![Key::new(KeyCode::Char('G')), Key::new(KeyCode::End)]),
            select: Key::new(KeyCode::Enter).into(),
        }
    }
}

impl Default for DiaryKeybindings {
    fn default() -> Self {
        Self {
            new: Key::new(KeyCode::Char('n')).into(),
            delete: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('d')),
                Key::new(KeyCode::Delete),
            ]),
            reload: Key::new(KeyCode::Char('r')).into(),
            login: Key::new(KeyCode::Char('L')).into(),
            logout: Key::with_ctrl(KeyCode::Char('l')).into(),
        }
    }
}

impl Default for EntryKeybindings {
    fn default() -> Self {
        Self {
            edit: Key::new(KeyCode::Char('e')).into(),
            add_retrospect: Key::new(KeyCode::Char('a')).into(),
            delete_retrospect: Key::new(KeyCode::Char('x')).into(),
            reload: Key::new(KeyCode::Char('r')).into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            confirm: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('y')),
                Key::new(KeyCode::Char('Y')),
                Key::new(KeyCode::Enter),
            ]),
            cancel: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('n')),
                Key::new(KeyCode::Char('N')),
                Key::new(KeyCode::Esc),
            ]),
            dismiss: KeyBinding::multiple(vec![
                Key::new(KeyCode::Enter),
                Key::new(KeyCode::Esc),
                Key::new(KeyCode::Char('q')),
            ]),
        }
    }
}
