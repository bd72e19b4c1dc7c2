//! # TaskView Component
//!
//! The list body: pending rows, a separator, then done rows.
//!
//! ```text
//! > [ ] Eggs          ← cursor row
//!   [ ] Bread
//!   ─────────
//!   [x] Milk
//! ```
//!
//! In Insert mode the text field is drawn inline, either between rows (new
//! task) or in place of the row being edited. Visual selection is drawn as a
//! highlighted block. The view scrolls to keep the cursor row visible.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::editor::{EditTarget, Editor, EditorMode};
use crate::core::task_list::Task;
use crate::tui::component::Component;

const CURSOR: &str = "> ";
const GUTTER: &str = "  ";
const PENDING_BOX: &str = "[ ] ";
const DONE_BOX: &str = "[x] ";
const SEPARATOR: &str = "─────────";

pub struct TaskView<'a> {
    pub editor: &'a Editor,
}

impl<'a> TaskView<'a> {
    pub fn new(editor: &'a Editor) -> Self {
        Self { editor }
    }

    fn task_line(&self, display_index: usize, task: &Task) -> Line<'static> {
        let editor = self.editor;
        let on_cursor = editor.mode() != EditorMode::Insert && display_index == editor.row();
        let selected = editor
            .selection()
            .is_some_and(|(start, end)| (start..=end).contains(&display_index));

        let mut style = Style::default();
        if task.done {
            style = style.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM);
        }
        if selected {
            style = style.bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD);
        }

        let marker = if on_cursor { CURSOR } else { GUTTER };
        let checkbox = if task.done { DONE_BOX } else { PENDING_BOX };
        Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{checkbox}{}", task.description), style),
        ])
    }

    fn field_line(&self) -> Line<'static> {
        Line::from(vec![
            Span::styled(CURSOR, Style::default().fg(Color::Yellow)),
            Span::raw(PENDING_BOX),
            Span::raw(self.editor.field().value()),
        ])
    }

    /// All lines plus the index of the line holding the cursor (the text
    /// field in Insert mode).
    fn build(&self) -> (Vec<Line<'static>>, usize) {
        let editor = self.editor;
        let list = editor.list();
        let (pending, done) = list.split_by_completion();

        let create_at = match editor.edit_target() {
            Some(EditTarget::Create { location }) if editor.mode() == EditorMode::Insert => {
                Some(location.min(pending.len()))
            }
            _ => None,
        };
        let editing = match editor.edit_target() {
            Some(EditTarget::Existing { id }) if editor.mode() == EditorMode::Insert => Some(id),
            _ => None,
        };

        let mut lines = Vec::with_capacity(list.len() + 2);
        let mut cursor_line = 0;
        for (i, task) in pending.iter().enumerate() {
            if create_at == Some(i) {
                cursor_line = lines.len();
                lines.push(self.field_line());
            }
            if editing == Some(task.id) {
                cursor_line = lines.len();
                lines.push(self.field_line());
                continue;
            }
            if i == editor.row() && create_at.is_none() {
                cursor_line = lines.len();
            }
            lines.push(self.task_line(i, task));
        }
        if create_at == Some(pending.len()) {
            cursor_line = lines.len();
            lines.push(self.field_line());
        }

        if !done.is_empty() {
            lines.push(Line::styled(
                format!("{GUTTER}{SEPARATOR}"),
                Style::default().add_modifier(Modifier::DIM),
            ));
        }
        for (j, task) in done.iter().enumerate() {
            let i = pending.len() + j;
            if editing == Some(task.id) {
                cursor_line = lines.len();
                lines.push(self.field_line());
                continue;
            }
            if i == editor.row() && create_at.is_none() {
                cursor_line = lines.len();
            }
            lines.push(self.task_line(i, task));
        }

        if lines.is_empty() {
            lines.push(Line::styled(
                format!("{GUTTER}No tasks yet."),
                Style::default().add_modifier(Modifier::DIM),
            ));
        }
        (lines, cursor_line)
    }
}

impl Component for TaskView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let (lines, cursor_line) = self.build();
        let height = area.height.max(1) as usize;
        let offset = cursor_line.saturating_sub(height - 1);

        frame.render_widget(Paragraph::new(lines).scroll((offset as u16, 0)), area);

        if self.editor.mode() == EditorMode::Insert {
            let prefix = (CURSOR.len() + PENDING_BOX.len()) as u16;
            let x = area.x + prefix + self.editor.field().cursor_column() as u16;
            let y = area.y + (cursor_line - offset) as u16;
            frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(1)), y));
        }
    }
}
