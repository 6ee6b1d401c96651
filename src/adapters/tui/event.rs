use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Quit,
    CloseModal,

    // Movement
    Next,
    Previous,
    PageDown,
    PageUp,
    Tab,
    BackTab,

    // Choice and relation fields
    CycleNext,
    CyclePrevious,

    Submit,

    // Input handling
    Character(char),
    Backspace,
    Enter,

    Tick,
}

pub struct EventHandler {
    should_quit: bool,
}

impl EventHandler {
    pub fn new() -> Self {
        Self { should_quit: false }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn next_event(&mut self) -> Result<AppEvent> {
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key_event) => Ok(self.handle_key_event(key_event)),
                _ => Ok(AppEvent::Tick),
            }
        } else {
            Ok(AppEvent::Tick)
        }
    }

    /// Letters are always passed through as characters; screens decide
    /// whether they are commands or text.
    fn handle_key_event(&mut self, key_event: KeyEvent) -> AppEvent {
        match key_event {
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                self.should_quit = true;
                AppEvent::Quit
            }

            KeyEvent {
                code: KeyCode::Char('s'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => AppEvent::Submit,

            KeyEvent {
                code: KeyCode::Esc, ..
            } => AppEvent::CloseModal,

            KeyEvent {
                code: KeyCode::Tab,
                modifiers: KeyModifiers::NONE,
                ..
            } => AppEvent::Tab,

            KeyEvent {
                code: KeyCode::BackTab,
                ..
            } => AppEvent::BackTab,

            KeyEvent {
                code: KeyCode::Enter,
                ..
            } => AppEvent::Enter,

            KeyEvent {
                code: KeyCode::Down, ..
            } => AppEvent::Next,

            KeyEvent {
                code: KeyCode::Up, ..
            } => AppEvent::Previous,

            KeyEvent {
                code: KeyCode::Right,
                ..
            } => AppEvent::CycleNext,

            KeyEvent {
                code: KeyCode::Left, ..
            } => AppEvent::CyclePrevious,

            KeyEvent {
                code: KeyCode::Char('d'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }
            | KeyEvent {
                code: KeyCode::PageDown,
                ..
            } => AppEvent::PageDown,

            KeyEvent {
                code: KeyCode::Char('u'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }
            | KeyEvent {
                code: KeyCode::PageUp,
                ..
            } => AppEvent::PageUp,

            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::NONE,
                ..
            } => AppEvent::Character(c),

            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::SHIFT,
                ..
            } => AppEvent::Character(c.to_uppercase().next().unwrap_or(c)),

            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => AppEvent::Backspace,

            _ => AppEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_key_mapping() {
        let mut handler = EventHandler::new();

        assert_eq!(
            handler.handle_key_event(key(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            AppEvent::Submit
        );
        assert_eq!(
            handler.handle_key_event(key(KeyCode::Char('q'), KeyModifiers::NONE)),
            AppEvent::Character('q')
        );
        assert_eq!(
            handler.handle_key_event(key(KeyCode::Char('g'), KeyModifiers::SHIFT)),
            AppEvent::Character('G')
        );
        assert_eq!(
            handler.handle_key_event(key(KeyCode::Right, KeyModifiers::NONE)),
            AppEvent::CycleNext
        );
        assert!(!handler.should_quit());

        assert_eq!(
            handler.handle_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppEvent::Quit
        );
        assert!(handler.should_quit());
    }
}
