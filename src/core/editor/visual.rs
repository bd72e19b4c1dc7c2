//! Visual mode: actions over the inclusive display range between the anchor
//! and the cursor. The range is resolved to ids when the action fires.

use log::debug;

use super::{Editor, EditorMode, Effect};
use crate::core::error::Result;
use crate::core::keymap::VisualAction;
use crate::core::task_list::TaskId;

impl Editor {
    pub(super) fn handle_visual(&mut self, key: &str) -> Result<Effect> {
        let Some(action) = self.keymap.visual.action(key) else {
            return Ok(Effect::None);
        };

        match action {
            VisualAction::Up => self.move_up(1),
            VisualAction::UpFive => self.move_up(5),
            VisualAction::Down => self.move_down(1),
            VisualAction::DownFive => self.move_down(5),
            VisualAction::JumpUp => self.jump_up(),
            VisualAction::JumpDown => self.jump_down(),
            VisualAction::NormalMode => self.leave_visual(),
            VisualAction::QuitNoWarning => return Ok(Effect::Quit),

            VisualAction::Yank => {
                let (start, end) = self.visual_range();
                self.copy_buffer = self.copy_range(start, end)?;
                self.leave_visual();
            }
            VisualAction::Delete => {
                let (start, end) = self.visual_range();
                self.copy_buffer = self.copy_range(start, end)?;
                for id in self.range_ids(start, end)? {
                    self.list.remove_task(id)?;
                }
                debug!("Cut {} tasks from {:?}", end - start + 1, self.list.name());
                self.dirty = true;
                self.clamp_row();
                self.leave_visual();
            }
            VisualAction::ToggleCompletion => {
                let (start, end) = self.visual_range();
                let ids = self.range_ids(start, end)?;
                for id in &ids {
                    self.list.toggle_completion(*id)?;
                }
                self.dirty = true;
                self.move_up(ids.len());
                self.leave_visual();
            }
        }
        Ok(Effect::None)
    }

    fn visual_range(&self) -> (usize, usize) {
        self.selection().unwrap_or((self.row, self.row))
    }

    fn range_ids(&self, start: usize, end: usize) -> Result<Vec<TaskId>> {
        (start..=end).map(|i| self.list.id_at_display(i)).collect()
    }

    fn leave_visual(&mut self) {
        self.sel_start = None;
        self.enter_mode(EditorMode::Normal);
    }
}
