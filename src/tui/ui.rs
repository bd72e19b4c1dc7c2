use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::editor::{Editor, EditorMode};
use crate::tui::component::Component;
use crate::tui::components::{ConfirmDialog, HelpBar, TaskView};

/// One full frame: title, list body, help bar, and the quit dialog when
/// it is up.
pub fn draw_ui(frame: &mut Frame, editor: &Editor) {
    use Constraint::{Length, Min};

    let mut help = HelpBar::for_editor(editor);
    let help_height = help.height(frame.area().width);
    let layout = Layout::vertical([Length(1), Length(1), Min(0), Length(help_height)]);
    let [title_area, _gap, list_area, help_area] = layout.areas(frame.area());

    draw_title(frame, title_area, editor);
    TaskView::new(editor).render(frame, list_area);
    help.render(frame, help_area);

    if editor.confirming_quit() {
        ConfirmDialog::quit().render(frame, frame.area());
    }
}

fn draw_title(frame: &mut Frame, area: Rect, editor: &Editor) {
    let list = editor.list();
    let mut spans = vec![
        Span::styled(list.name().to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}/{} done", list.num_done(), list.len())),
    ];
    if editor.is_dirty() {
        spans.push(Span::styled(" (*)", Style::default().fg(Color::Yellow)));
    }
    let mode = match editor.mode() {
        EditorMode::Normal => None,
        EditorMode::Insert => Some("-- INSERT --"),
        EditorMode::Visual => Some("-- VISUAL --"),
    };
    if let Some(mode) = mode {
        spans.push(Span::styled(format!("  {mode}"), Style::default().fg(Color::Cyan)));
    }
    frame.render_widget(Line::from(spans), area);
}
