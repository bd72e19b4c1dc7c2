//! Single-line text input used by Insert mode.

use unicode_width::UnicodeWidthChar;

/// Longest description that can be typed, in characters. Longer text set
/// with [`TextField::set_value`] is kept whole.
pub const CHAR_LIMIT: usize = 156;

#[derive(Debug, Clone, Default)]
pub struct TextField {
    chars: Vec<char>,
    cursor: usize,
}

impl TextField {
    pub fn value(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Replace the content and put the cursor at the end.
    pub fn set_value(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.cursor = self.chars.len();
    }

    pub fn reset(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Terminal columns occupied by the text before the cursor.
    pub fn cursor_column(&self) -> usize {
        self.chars[..self.cursor]
            .iter()
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    /// Apply an editing key. Returns false for keys the field does not use.
    pub fn handle_key(&mut self, key: &str) -> bool {
        match key {
            "backspace" => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.chars.remove(self.cursor);
                }
            }
            "delete" => {
                if self.cursor < self.chars.len() {
                    self.chars.remove(self.cursor);
                }
            }
            "left" => self.cursor = self.cursor.saturating_sub(1),
            "right" => self.cursor = (self.cursor + 1).min(self.chars.len()),
            "home" | "ctrl+a" => self.cursor = 0,
            "end" | "ctrl+e" => self.cursor = self.chars.len(),
            _ => {
                let mut it = key.chars();
                match (it.next(), it.next()) {
                    (Some(c), None) if !c.is_control() => self.insert(c),
                    _ => return false,
                }
            }
        }
        true
    }

    fn insert(&mut self, c: char) {
        if self.chars.len() >= CHAR_LIMIT {
            return;
        }
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> TextField {
        let mut field = TextField::default();
        for c in text.chars() {
            assert!(field.handle_key(&c.to_string()));
        }
        field
    }

    #[test]
    fn test_typing_and_editing() {
        let mut field = typed("milk");
        assert_eq!(field.value(), "milk");
        field.handle_key("left");
        field.handle_key("backspace");
        assert_eq!(field.value(), "mik");
        field.handle_key("home");
        field.handle_key("delete");
        assert_eq!(field.value(), "ik");
        field.handle_key("end");
        field.handle_key("s");
        assert_eq!(field.value(), "iks");
        assert_eq!(field.cursor(), 3);
    }

    #[test]
    fn test_named_keys_are_not_text() {
        let mut field = TextField::default();
        assert!(!field.handle_key("esc"));
        assert!(!field.handle_key("ctrl+c"));
        assert!(!field.handle_key("tab"));
        assert!(field.is_empty());
    }

    #[test]
    fn test_char_limit() {
        let mut field = typed(&"a".repeat(CHAR_LIMIT));
        field.handle_key("b");
        assert_eq!(field.value().len(), CHAR_LIMIT);

        field.set_value(&"x".repeat(CHAR_LIMIT + 10));
        assert_eq!(field.value().chars().count(), CHAR_LIMIT + 10);
        field.handle_key("y");
        assert_eq!(field.value().chars().count(), CHAR_LIMIT + 10);
        field.handle_key("backspace");
        assert_eq!(field.value().chars().count(), CHAR_LIMIT + 9);
    }

    #[test]
    fn test_cursor_column_counts_wide_chars() {
        let mut field = TextField::default();
        field.set_value("日本a");
        assert_eq!(field.cursor(), 3);
        assert_eq!(field.cursor_column(), 5);
        field.handle_key("left");
        assert_eq!(field.cursor_column(), 4);
    }

    #[test]
    fn test_space_is_text() {
        let field = typed("a b");
        assert_eq!(field.value(), "a b");
    }
}
