#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    Suspend,
    Theme,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Select,
}

/// Actions on the diary entry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiaryAction {
    New,
    Delete,
    Reload,
    Login,
    Logout,
}

/// Actions on a single opened entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    Edit,
    AddRetrospect,
    DeleteRetrospect,
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Confirm,
    Cancel,
    Dismiss,
}
