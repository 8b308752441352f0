use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Quit,
    FocusNext,
    FocusPrevious,
    Digit(char),
    Backspace,
    /// Space: flips a checkbox, or presses the button when it has focus.
    Toggle,
    /// Enter: Start or Reset, wherever the focus is.
    Activate,
    Redraw,
}

pub struct EventConversionUndefinedError;

impl TryFrom<CrosstermEvent> for Event {
    type Error = EventConversionUndefinedError;

    fn try_from(value: CrosstermEvent) -> Result<Self, Self::Error> {
        match value {
            CrosstermEvent::Key(key_event) if key_event.kind == KeyEventKind::Release => None,
            CrosstermEvent::Key(key_event)
                if key_event.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                match key_event.code {
                    KeyCode::Char('c') => Some(Event::Quit),
                    _ => None,
                }
            }
            CrosstermEvent::Key(key_event) => match key_event.code {
                KeyCode::Char('q') => Some(Event::Quit),
                KeyCode::Esc => Some(Event::Quit),
                KeyCode::Char(c) if c.is_ascii_digit() => Some(Event::Digit(c)),
                KeyCode::Char(' ') => Some(Event::Toggle),
                KeyCode::Enter => Some(Event::Activate),
                KeyCode::Backspace | KeyCode::Delete => Some(Event::Backspace),
                KeyCode::Tab | KeyCode::Down => Some(Event::FocusNext),
                KeyCode::BackTab | KeyCode::Up => Some(Event::FocusPrevious),
                _ => None,
            },
            CrosstermEvent::Resize(_, _) => Some(Event::Redraw),
            _ => None,
        }
        .ok_or(EventConversionUndefinedError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent::new(code, modifiers))
    }

    fn convert(event: CrosstermEvent) -> Option<Event> {
        Event::try_from(event).ok()
    }

    #[test]
    fn maps_form_keys() {
        assert_eq!(convert(key(KeyCode::Char('7'), KeyModifiers::NONE)), Some(Event::Digit('7')));
        assert_eq!(convert(key(KeyCode::Tab, KeyModifiers::NONE)), Some(Event::FocusNext));
        assert_eq!(convert(key(KeyCode::BackTab, KeyModifiers::SHIFT)), Some(Event::FocusPrevious));
        assert_eq!(convert(key(KeyCode::Char(' '), KeyModifiers::NONE)), Some(Event::Toggle));
        assert_eq!(convert(key(KeyCode::Enter, KeyModifiers::NONE)), Some(Event::Activate));
        assert_eq!(convert(key(KeyCode::Char('x'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn ctrl_c_quits() {
        assert_eq!(convert(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(Event::Quit));
        assert_eq!(convert(key(KeyCode::Char('x'), KeyModifiers::CONTROL)), None);
    }
}
