pub mod components;

mod error_dialog;
mod status_bar;
mod theme_selector;
mod toast;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};

pub use color_eyre::Result;

use crate::Theme;

pub use components::{ConfirmDialog, ConfirmStyle, List, ListEvent, ListRow, TextInput, TextInputEvent};
pub use error_dialog::ErrorDialog;
pub use status_bar::{Keybinding, StatusBar, StatusInfo};
pub use theme_selector::ThemeSelector;
pub use toast::{Toast, ToastManager, ToastType};

/// Result of handling an input event.
///
/// This enum represents the three possible outcomes of handling an input event:
/// - `Ignored` - The handler didn't recognize or handle this input
/// - `Consumed` - The input was handled but produced no message, the input will not be propagated further
/// - `Event(E)` - The input was handled and produced a message, the input will not be propagated further
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult<E> {
    /// Input was not handled, parent should process it.
    Ignored,
    /// Input was consumed but produced no event.
    Consumed,
    /// Input was consumed and produced an event.
    Event(E),
}

impl<E> From<E> for EventResult<E> {
    fn from(event: E) -> Self {
        Self::Event(event)
    }
}

/// Outcome reported by a dialog on the stack.
///
/// Every dialog speaks the same vocabulary so that the single shared stack
/// can hold dialogs from any screen. The owner matches on the id the event
/// is tagged with to know which of its dialogs answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    /// Primary action chosen ("Yes", "Log in").
    Confirmed,
    /// Secondary action chosen ("No", "Cancel").
    Cancelled,
    /// Dialog acknowledged or closed from its backdrop.
    Dismissed,
    /// Text or a selection was submitted.
    Submitted(String),
}

/// Interactive UI building block.
///
/// Components are reusable widgets that handle input events and emit
/// generic outputs. They know nothing about business logic.
pub trait Component {
    /// The output type produced by this component.
    type Output;

    /// Handle a key event.
    ///
    /// Returns `Ok(EventResult::...)` where:
    /// - `Ignored` - key was not handled, parent should process it
    /// - `Consumed` - key was handled but produced no output
    /// - `Event(output)` - key was handled and produced an output
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        _ = key;
        Ok(EventResult::Ignored)
    }

    /// Called on each tick for animations and time-based updates.
    fn handle_tick(&mut self) {}

    /// Render the component to the frame.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}

/// Ephemeral overlay that blocks the screen below.
///
/// Modals live on the shared dialog stack. The stack gives keys to the
/// topmost modal only and draws every modal inside the area it computes
/// from [`Modal::size`], over its own backdrop.
///
/// # Examples
///
/// - `ConfirmDialog` - confirmation before deleting an entry
/// - `TextInput` - title, body and retrospect input
/// - `ErrorDialog` - failed command report
pub trait Modal {
    /// Handle a key event while this modal is topmost.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<DialogEvent>>;

    /// Render the modal into the area reserved for its content.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Width and height of the content area, centered on the frame.
    fn size(&self) -> (Constraint, Constraint) {
        (Constraint::Percentage(50), Constraint::Length(7))
    }

    /// Title shown in the modal header (optional).
    fn title(&self) -> Option<&str> {
        None
    }
}

impl<M: Modal + ?Sized> Modal for Box<M> {
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<DialogEvent>> {
        (**self).handle_key(key)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        (**self).render(frame, area, theme);
    }

    fn size(&self) -> (Constraint, Constraint) {
        (**self).size()
    }

    fn title(&self) -> Option<&str> {
        (**self).title()
    }
}
