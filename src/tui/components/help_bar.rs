//! # HelpBar Component
//!
//! Bottom bar listing the effective bindings of the current mode, built from
//! the resolved key map so user overrides show up as they are.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::core::editor::{Editor, EditorMode};
use crate::core::keymap::{Command, ModeBindings, display_key};
use crate::tui::component::Component;

pub struct HelpBar {
    /// (key, help label)
    pub entries: Vec<(String, &'static str)>,
}

fn entries_for<A: Command>(bindings: &ModeBindings<A>) -> Vec<(String, &'static str)> {
    bindings
        .bindings()
        .map(|(action, key)| (display_key(key).to_string(), action.help()))
        .collect()
}

impl HelpBar {
    pub fn for_editor(editor: &Editor) -> Self {
        let keymap = editor.keymap();
        let entries = match editor.mode() {
            EditorMode::Normal => entries_for(&keymap.normal),
            EditorMode::Insert => entries_for(&keymap.insert),
            EditorMode::Visual => entries_for(&keymap.visual),
        };
        Self { entries }
    }

    /// Rows needed to show every entry at `width`.
    pub fn height(&self, width: u16) -> u16 {
        self.paragraph().line_count(width).max(1) as u16
    }

    fn paragraph(&self) -> Paragraph<'static> {
        let key_style = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);
        let mut spans = Vec::with_capacity(self.entries.len() * 3);
        for (i, (key, help)) in self.entries.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" • ", dim));
            }
            spans.push(Span::styled(key.clone(), key_style));
            spans.push(Span::styled(format!(" {help}"), dim));
        }
        Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true })
    }
}

impl Component for HelpBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.paragraph(), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{editor_with, press};

    #[test]
    fn test_entries_follow_mode() {
        let mut editor = editor_with(&[("a", false)]);
        let normal = HelpBar::for_editor(&editor);
        assert!(normal.entries.contains(&("w".to_string(), "write")));
        assert!(normal.entries.contains(&("space".to_string(), "mark done/not done")));

        press(&mut editor, &["i"]);
        let insert = HelpBar::for_editor(&editor);
        assert_eq!(insert.entries.len(), 3);
        assert!(insert.entries.contains(&("enter".to_string(), "save")));
    }

    #[test]
    fn test_height_grows_when_narrow() {
        let editor = editor_with(&[]);
        let bar = HelpBar::for_editor(&editor);
        assert!(bar.height(20) > bar.height(400));
    }
}
