use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{DiaryAction, DialogAction, EntryAction, GlobalAction, NavAction};
use crate::config::keybindings::KeybindingsConfig;

/// Maps key events to configured actions and back to display strings.
pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
            GlobalAction::Suspend => kb.suspend.matches(event),
            GlobalAction::Theme => kb.theme.matches(event),
            GlobalAction::Back => kb.back.matches(event),
        }
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.display(),
            GlobalAction::Suspend => kb.suspend.display(),
            GlobalAction::Theme => kb.theme.display(),
            GlobalAction::Back => kb.back.display(),
        }
    }

    // Navigation actions
    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.matches(event),
            NavAction::Down => kb.down.matches(event),
            NavAction::PageUp => kb.page_up.matches(event),
            NavAction::PageDown => kb.page_down.matches(event),
            NavAction::Home => kb.home.matches(event),
            NavAction::End => kb.end.matches(event),
            NavAction::Select => kb.select.matches(event),
        }
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.display(),
            NavAction::Down => kb.down.display(),
            NavAction::PageUp => kb.page_up.display(),
            NavAction::PageDown => kb.page_down.display(),
            NavAction::Home => kb.home.display(),
            NavAction::End => kb.end.display(),
            NavAction::Select => kb.select.display(),
        }
    }

    // Diary list actions
    pub fn matches_diary(&self, event: &KeyEvent, action: DiaryAction) -> bool {
        let kb = &self.keybindings.diary;
        match action {
            DiaryAction::New => kb.new.matches(event),
            DiaryAction::Delete => kb.delete.matches(event),
            DiaryAction::Reload => kb.reload.matches(event),
            DiaryAction::Login => kb.login.matches(event),
            DiaryAction::Logout => kb.logout.matches(event),
        }
    }

    pub fn display_diary(&self, action: DiaryAction) -> String {
        let kb = &self.keybindings.diary;
        match action {
            DiaryAction::New => kb.new.display(),
            DiaryAction::Delete => kb.delete.display(),
            DiaryAction::Reload => kb.reload.display(),
            DiaryAction::Login => kb.login.display(),
            DiaryAction::Logout => kb.logout.display(),
        }
    }

    // Entry actions
    pub fn matches_entry(&self, event: &KeyEvent, action: EntryAction) -> bool {
        let kb = &self.keybindings.entry;
        match action {
            EntryAction::Edit => kb.edit.matches(event),
            EntryAction::AddRetrospect => kb.add_retrospect.matches(event),
            EntryAction::DeleteRetrospect => kb.delete_retrospect.matches(event),
            EntryAction::Reload => kb.reload.matches(event),
        }
    }

    pub fn display_entry(&self, action: EntryAction) -> String {
        let kb = &self.keybindings.entry;
        match action {
            EntryAction::Edit => kb.edit.display(),
            EntryAction::AddRetrospect => kb.add_retrospect.display(),
            EntryAction::DeleteRetrospect => kb.delete_retrospect.display(),
            EntryAction::Reload => kb.reload.display(),
        }
    }

    // Dialog actions
    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => kb.confirm.matches(event),
            DialogAction::Cancel => kb.cancel.matches(event),
            DialogAction::Dismiss => kb.dismiss.matches(event),
        }
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => kb.confirm.first_key().display(),
            DialogAction::Cancel => kb.cancel.first_key().display(),
            DialogAction::Dismiss => kb.dismiss.display(),
        }
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    #[test]
    fn test_default_diary_bindings() {
        let resolver = KeyResolver::default();
        let delete = KeyEvent::new(KeyCode::Delete, KeyModifiers::NONE);
        let logout = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL);

        assert!(resolver.matches_diary(&delete, DiaryAction::Delete));
        assert!(resolver.matches_diary(&logout, DiaryAction::Logout));
        assert!(!resolver.matches_diary(&logout, DiaryAction::Login));
    }

    #[test]
    fn test_dialog_display_uses_first_key() {
        let resolver = KeyResolver::default();
        assert_eq!(resolver.display_dialog(DialogAction::Confirm), "y");
        assert_eq!(resolver.display_dialog(DialogAction::Cancel), "n");
    }
}
