//! Unsaved-changes dialog drawn over the list.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};

use crate::tui::component::Component;

pub const QUIT_MESSAGE: &str =
    "You have unsaved changes. Are you sure you want to quit? (y/enter = yes, n = no)";

pub struct ConfirmDialog {
    pub message: &'static str,
}

impl ConfirmDialog {
    pub fn quit() -> Self {
        Self {
            message: QUIT_MESSAGE,
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

impl Component for ConfirmDialog {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width.min(50);
        let paragraph = Paragraph::new(self.message)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::bordered()
                    .title(" Quit ")
                    .border_style(Style::default().fg(Color::Yellow)),
            );
        let height = (paragraph.line_count(width.saturating_sub(2)) as u16 + 2).min(area.height);
        let popup = centered(area, width, height);
        frame.render_widget(Clear, popup);
        frame.render_widget(paragraph, popup);
    }
}
