use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Theme;
use crate::commands::SignInCmd;
use crate::screen::{Screen, ScreenContext, ScreenMsg};
use crate::ui::{Component, EventResult, Keybinding, Result, TextInput, TextInputEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Username,
    Password,
}

/// Username and password form.
///
/// Submitting runs the sign-in command; the App leaves this screen once the
/// session is written.
pub struct LoginScreen {
    ctx: ScreenContext,
    username: TextInput,
    password: TextInput,
    focus: Field,
    signing_in: bool,
}

impl LoginScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        let mut password = password_input();
        password.set_focused(false);
        Self {
            ctx,
            username: TextInput::new("Username"),
            password,
            focus: Field::Username,
            signing_in: false,
        }
    }

    fn focus(&mut self, field: Field) {
        self.focus = field;
        self.username.set_focused(field == Field::Username);
        self.password.set_focused(field == Field::Password);
    }

    fn submit(&mut self) -> EventResult<ScreenMsg> {
        let username = self.username.value().trim().to_string();
        let password = self.password.value().to_string();
        if username.is_empty() {
            self.focus(Field::Username);
            return EventResult::Consumed;
        }
        if password.is_empty() {
            self.focus(Field::Password);
            return EventResult::Consumed;
        }

        self.signing_in = true;
        ScreenMsg::from(SignInCmd::new(
            Arc::clone(&self.ctx.sessions),
            username,
            password,
        ))
        .into()
    }
}

fn password_input() -> TextInput {
    TextInput::new("Password").masked()
}

impl Screen for LoginScreen {
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<ScreenMsg>> {
        if self.signing_in {
            return Ok(EventResult::Consumed);
        }
        if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
            let next = match self.focus {
                Field::Username => Field::Password,
                Field::Password => Field::Username,
            };
            self.focus(next);
            return Ok(EventResult::Consumed);
        }

        let input = match self.focus {
            Field::Username => &mut self.username,
            Field::Password => &mut self.password,
        };
        Ok(match Component::handle_key(input, key)? {
            EventResult::Event(TextInputEvent::Submitted(_)) if self.focus == Field::Username => {
                self.focus(Field::Password);
                EventResult::Consumed
            }
            EventResult::Event(TextInputEvent::Submitted(_)) => self.submit(),
            EventResult::Event(TextInputEvent::Cancelled) => ScreenMsg::Back.into(),
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => EventResult::Ignored,
        })
    }

    fn command_failed(&mut self) {
        self.signing_in = false;
        self.password = password_input();
        self.focus(Field::Password);
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let form_area = area.centered(Constraint::Length(50), Constraint::Length(11));

        let block = Block::default()
            .title(" Sign in ")
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border_focused()));
        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(inner);

        Component::render(&mut self.username, frame, chunks[0], theme);
        Component::render(&mut self.password, frame, chunks[1], theme);

        let status = if self.signing_in {
            "Signing in..."
        } else {
            "Tab to switch fields, Enter to sign in"
        };
        frame.render_widget(
            Paragraph::new(status).style(Style::default().fg(theme.overlay1())),
            chunks[2],
        );
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec!["Sign in".to_string()]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new("Tab", "Next field"),
            Keybinding::new("Enter", "Sign in"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::app::AppMessage;
    use crate::screen::testing;

    fn press(screen: &mut LoginScreen, code: KeyCode) -> EventResult<ScreenMsg> {
        screen
            .handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_str(screen: &mut LoginScreen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn test_enter_moves_to_password_then_signs_in() {
        let mut fixture = testing::fixture(false).await;
        let mut screen = LoginScreen::new(fixture.ctx.clone());

        type_str(&mut screen, "ada");
        assert!(matches!(press(&mut screen, KeyCode::Enter), EventResult::Consumed));
        assert_eq!(screen.focus, Field::Password);

        type_str(&mut screen, "secret");
        let EventResult::Event(ScreenMsg::Run(commands)) = press(&mut screen, KeyCode::Enter)
        else {
            panic!("expected a sign-in command");
        };
        assert!(screen.signing_in);

        for command in commands {
            command.execute(fixture.tx.clone()).await.unwrap();
        }
        assert!(matches!(
            fixture.rx.try_recv(),
            Ok(AppMessage::SignedIn { username }) if username == "ada"
        ));
    }

    #[tokio::test]
    async fn test_empty_password_keeps_focus_on_form() {
        let fixture = testing::fixture(false).await;
        let mut screen = LoginScreen::new(fixture.ctx.clone());

        type_str(&mut screen, "ada");
        press(&mut screen, KeyCode::Enter);
        assert!(matches!(press(&mut screen, KeyCode::Enter), EventResult::Consumed));
        assert!(!screen.signing_in);
        assert_eq!(screen.focus, Field::Password);
    }

    #[tokio::test]
    async fn test_escape_goes_back() {
        let fixture = testing::fixture(false).await;
        let mut screen = LoginScreen::new(fixture.ctx.clone());

        assert!(matches!(
            press(&mut screen, KeyCode::Esc),
            EventResult::Event(ScreenMsg::Back)
        ));
    }

    #[tokio::test]
    async fn test_failed_sign_in_clears_password() {
        let fixture = testing::fixture(false).await;
        let mut screen = LoginScreen::new(fixture.ctx.clone());
        type_str(&mut screen, "ada");
        press(&mut screen, KeyCode::Enter);
        type_str(&mut screen, "wrong");
        press(&mut screen, KeyCode::Enter);

        screen.command_failed();

        assert!(!screen.signing_in);
        assert_eq!(screen.password.value(), "");
        assert_eq!(screen.username.value(), "ada");
    }
}
