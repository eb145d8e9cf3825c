pub mod actions;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

use std::path::PathBuf;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::{data_dir, load, save_theme};
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

const DIARY_FILE: &str = "diary.json";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

/// Where the diary and the session live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub diary_path: Option<PathBuf>,
    pub session_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn diary_path(&self) -> PathBuf {
        self.diary_path
            .clone()
            .unwrap_or_else(|| data_dir().join(DIARY_FILE))
    }

    pub fn session_path(&self) -> PathBuf {
        self.session_path
            .clone()
            .unwrap_or_else(|| data_dir().join(SESSION_FILE))
    }
}

/// Local sign-in settings.
///
/// Without a configured username and password any non-empty credentials are
/// accepted; the diary is local and the sign-in only gates editing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub session_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            session_hours: 24 * 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.theme.name, "Catppuccin Mocha");
        assert_eq!(config.auth.session_hours, 24 * 7);
        assert!(config.storage.diary_path.is_none());
    }

    #[test]
    fn test_partial_keybindings_override() {
        let config: AppConfig = toml::from_str(
            r#"
            [keybindings.diary]
            new = "ctrl+n"

            [storage]
            diary_path = "/tmp/my-diary.json"
            "#,
        )
        .unwrap();

        let resolver = KeyResolver::new(std::sync::Arc::new(config.keybindings));
        let ctrl_n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);
        let delete = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE);
        assert!(resolver.matches_diary(&ctrl_n, DiaryAction::New));
        assert!(resolver.matches_diary(&delete, DiaryAction::Delete));
        assert_eq!(
            config.storage.diary_path(),
            PathBuf::from("/tmp/my-diary.json")
        );
    }
}
