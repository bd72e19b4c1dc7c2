use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    /// A key press in the editor's key-string form ("k", "ctrl+c", "esc").
    Key(String),
    Resize,
}

/// Poll for an event, blocking up to `timeout`.
pub fn poll_event_timeout(timeout: Duration) -> io::Result<Option<TuiEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    let event = match event::read()? {
        Event::Key(key_event) => {
            log::debug!("Key event: {:?} with modifiers {:?}", key_event.code, key_event.modifiers);
            key_string(&key_event).map(TuiEvent::Key)
        }
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    };
    Ok(event)
}

/// Translate a crossterm key event into the string form used by key
/// bindings. Releases and repeats are dropped.
pub fn key_string(key: &KeyEvent) -> Option<String> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    let name = match key.code {
        KeyCode::Char(c) if ctrl => format!("ctrl+{}", c.to_ascii_lowercase()),
        KeyCode::Char(c) if alt => format!("alt+{c}"),
        // Shift is already folded into the character
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pgup".to_string(),
        KeyCode::PageDown => "pgdown".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::BackTab => "shift+tab".to_string(),
        KeyCode::F(n) => format!("f{n}"),
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn key(event: KeyEvent) -> String {
        key_string(&event).expect("key should translate")
    }

    #[test]
    fn test_plain_and_shifted_chars() {
        assert_eq!(key(press(KeyCode::Char('k'), KeyModifiers::NONE)), "k");
        assert_eq!(key(press(KeyCode::Char('K'), KeyModifiers::SHIFT)), "K");
        assert_eq!(key(press(KeyCode::Char(' '), KeyModifiers::NONE)), " ");
        assert_eq!(key(press(KeyCode::Char('{'), KeyModifiers::SHIFT)), "{");
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(key(press(KeyCode::Char('c'), KeyModifiers::CONTROL)), "ctrl+c");
        assert_eq!(key(press(KeyCode::Esc, KeyModifiers::NONE)), "esc");
        assert_eq!(key(press(KeyCode::Enter, KeyModifiers::NONE)), "enter");
        assert_eq!(key(press(KeyCode::F(2), KeyModifiers::NONE)), "f2");
    }

    #[test]
    fn test_release_is_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('k'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(key_string(&release), None);
    }
}
