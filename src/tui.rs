//! Terminal session for lazydiary.
//!
//! [`Tui`] owns raw mode, the alternate screen and mouse capture, and feeds
//! one [`Event`] channel from three sources: crossterm input, the tick and
//! frame timers, and SIGTERM.

use std::io::Stdout;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::cursor;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, EventStream, KeyCode,
    KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use futures::{FutureExt, StreamExt};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// How long `stop` waits before aborting the input task, then giving up.
const ABORT_AFTER: Duration = Duration::from_millis(500);
const GIVE_UP_AFTER: Duration = Duration::from_millis(2000);

pub type Backend = CrosstermBackend<Stdout>;

/// Everything the app loop reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Quit,
    Error(String),
    /// Advances toast timers.
    Tick,
    Render,
    Key(KeyEvent),
    /// Left clicks (backdrop dismissal) and wheel scrolling only.
    Mouse(MouseEvent),
    Resize(u16, u16),
}

/// Map a terminal event onto the app's vocabulary.
///
/// Key releases and repeats, mouse motion, drags, focus changes and pastes
/// have no meaning in the diary and are dropped here. Ctrl+C always quits,
/// even when a dialog is open.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                Some(Event::Quit)
            } else {
                Some(Event::Key(key))
            }
        }
        CrosstermEvent::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left)
            | MouseEventKind::ScrollUp
            | MouseEventKind::ScrollDown => Some(Event::Mouse(mouse)),
            _ => None,
        },
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}

pub struct Tui {
    terminal: Terminal<Backend>,
    input_task: JoinHandle<()>,
    cancel: CancellationToken,
    events: UnboundedReceiver<Event>,
    sender: UnboundedSender<Event>,
    frame_every: Duration,
    tick_every: Duration,
}

impl Tui {
    /// `frame_rate` and `tick_rate` are per second.
    pub fn new(frame_rate: f64, tick_rate: f64) -> Result<Self> {
        let (sender, events) = mpsc::unbounded_channel();
        Ok(Self {
            terminal: Terminal::new(Backend::new(std::io::stdout()))?,
            input_task: tokio::spawn(async {}),
            cancel: CancellationToken::new(),
            events,
            sender,
            frame_every: Duration::from_secs_f64(1.0 / frame_rate),
            tick_every: Duration::from_secs_f64(1.0 / tick_rate),
        })
    }

    /// Take over the terminal and start producing events.
    pub fn enter(&mut self) -> Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(
            std::io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        self.start();
        Ok(())
    }

    /// Stop producing events and hand the terminal back.
    pub fn exit(&mut self) -> Result<()> {
        self.stop()?;
        if crossterm::terminal::is_raw_mode_enabled()? {
            self.flush()?;
            crossterm::execute!(
                std::io::stdout(),
                DisableMouseCapture,
                LeaveAlternateScreen,
                cursor::Show
            )?;
            crossterm::terminal::disable_raw_mode()?;
        }
        Ok(())
    }

    /// Restore the terminal and stop the process (Ctrl+Z).
    pub fn suspend(&mut self) -> Result<()> {
        self.exit()?;
        #[cfg(not(windows))]
        signal_hook::low_level::raise(signal_hook::consts::SIGTSTP)?;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.enter()
    }

    pub async fn next_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    fn start(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.input_task = tokio::spawn(produce_events(
            self.sender.clone(),
            self.cancel.clone(),
            self.tick_every,
            self.frame_every,
        ));
    }

    fn stop(&mut self) -> Result<()> {
        self.cancel.cancel();
        let step = Duration::from_millis(1);
        let mut waited = Duration::ZERO;
        while !self.input_task.is_finished() {
            std::thread::sleep(step);
            waited += step;
            if waited >= ABORT_AFTER {
                self.input_task.abort();
            }
            if waited >= GIVE_UP_AFTER {
                return Err(eyre!("Input task did not stop"));
            }
        }
        Ok(())
    }
}

async fn produce_events(
    sender: UnboundedSender<Event>,
    cancel: CancellationToken,
    tick_every: Duration,
    frame_every: Duration,
) {
    #[cfg(unix)]
    forward_sigterm(sender.clone());

    let mut input = EventStream::new();
    let mut ticks = interval(tick_every);
    let mut frames = interval(frame_every);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticks.tick() => Event::Tick,
            _ = frames.tick() => Event::Render,
            next = input.next().fuse() => match next {
                Some(Ok(raw)) => match translate(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(err)) => Event::Error(err.to_string()),
                None => {
                    debug!("Terminal input closed");
                    break;
                }
            },
        };
        if sender.send(event).is_err() {
            break;
        }
    }
    cancel.cancel();
}

/// SIGTERM quits like Ctrl+C so the terminal is restored.
#[cfg(unix)]
fn forward_sigterm(sender: UnboundedSender<Event>) {
    tokio::spawn(async move {
        let terminate = tokio::signal::unix::SignalKind::terminate();
        match tokio::signal::unix::signal(terminate) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                let _ = sender.send(Event::Quit);
            }
            Err(err) => warn!(error = %err, "Could not install SIGTERM handler"),
        }
    });
}

impl Deref for Tui {
    type Target = Terminal<Backend>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(err) = self.exit() {
            error!(error = %err, "Failed to restore terminal");
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_ctrl_c_quits() {
        let event = key(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press);
        assert_eq!(translate(event), Some(Event::Quit));
    }

    #[test]
    fn test_only_key_presses_pass() {
        let press = key(KeyCode::Char('n'), KeyModifiers::NONE, KeyEventKind::Press);
        let release = key(KeyCode::Char('n'), KeyModifiers::NONE, KeyEventKind::Release);

        assert!(matches!(translate(press), Some(Event::Key(k)) if k.code == KeyCode::Char('n')));
        assert_eq!(translate(release), None);
    }

    #[test]
    fn test_mouse_is_limited_to_clicks_and_wheel() {
        for kind in [
            MouseEventKind::Down(MouseButton::Left),
            MouseEventKind::ScrollUp,
            MouseEventKind::ScrollDown,
        ] {
            let event = mouse(kind);
            assert_eq!(translate(CrosstermEvent::Mouse(event)), Some(Event::Mouse(event)));
        }
        for kind in [
            MouseEventKind::Moved,
            MouseEventKind::Up(MouseButton::Left),
            MouseEventKind::Drag(MouseButton::Left),
            MouseEventKind::Down(MouseButton::Right),
        ] {
            assert_eq!(translate(CrosstermEvent::Mouse(mouse(kind))), None);
        }
    }

    #[test]
    fn test_focus_and_paste_are_dropped() {
        assert_eq!(translate(CrosstermEvent::FocusGained), None);
        assert_eq!(translate(CrosstermEvent::FocusLost), None);
        assert_eq!(translate(CrosstermEvent::Paste("entry".to_string())), None);
        assert_eq!(
            translate(CrosstermEvent::Resize(80, 24)),
            Some(Event::Resize(80, 24))
        );
    }
}
