//! Normal mode.

use log::{debug, info};

use super::{CopiedTask, EditTarget, Editor, EditorMode, Effect, ListSink};
use crate::core::error::Result;
use crate::core::keymap::NormalAction;

impl Editor {
    pub(super) fn handle_normal(&mut self, key: &str, sink: &mut dyn ListSink) -> Result<Effect> {
        let Some(action) = self.keymap.normal.action(key) else {
            return Ok(Effect::None);
        };

        match action {
            NormalAction::Up => self.move_up(1),
            NormalAction::UpFive => self.move_up(5),
            NormalAction::Down => self.move_down(1),
            NormalAction::DownFive => self.move_down(5),
            NormalAction::JumpUp => self.jump_up(),
            NormalAction::JumpDown => self.jump_down(),

            NormalAction::QuitWithWarning => {
                if !self.dirty {
                    return Ok(Effect::Quit);
                }
                self.confirm_quit = true;
            }
            NormalAction::QuitNoWarning => return Ok(Effect::Quit),

            NormalAction::NewTask => self.begin_create(self.list.num_pending()),
            NormalAction::NewBefore => self.begin_create(self.row),
            NormalAction::NewAfter => self.begin_create(self.row + 1),
            NormalAction::EditTask => self.begin_edit(true)?,
            NormalAction::ClearAndEdit => self.begin_edit(false)?,

            NormalAction::DeleteTask => self.cut_current()?,
            NormalAction::Yank => {
                if !self.list.is_empty() {
                    self.copy_buffer = self.copy_range(self.row, self.row)?;
                }
            }
            NormalAction::ToggleCompletion => self.toggle_current()?,
            NormalAction::EnableVisualMode => {
                if !self.list.is_empty() {
                    self.sel_start = Some(self.row);
                    self.enter_mode(EditorMode::Visual);
                }
            }

            NormalAction::PasteAfter => {
                if self.paste(false)? {
                    self.move_down(1);
                }
            }
            NormalAction::PasteBefore => {
                self.paste(true)?;
            }

            NormalAction::Write => {
                sink.save_list(&self.list)?;
                self.dirty = false;
                info!(
                    "Wrote list {:?} ({} tasks, {} done)",
                    self.list.name(),
                    self.list.len(),
                    self.list.num_done()
                );
            }
        }
        Ok(Effect::None)
    }

    fn begin_create(&mut self, location: usize) {
        self.edit = Some(EditTarget::Create { location });
        self.field.reset();
        self.enter_mode(EditorMode::Insert);
    }

    fn begin_edit(&mut self, prefill: bool) -> Result<()> {
        if self.list.is_empty() {
            return Ok(());
        }
        let task = self.list.task_at_display(self.row)?;
        let id = task.id;
        if prefill {
            let description = task.description.clone();
            self.field.set_value(&description);
        } else {
            self.field.reset();
        }
        self.edit = Some(EditTarget::Existing { id });
        self.enter_mode(EditorMode::Insert);
        Ok(())
    }

    fn cut_current(&mut self) -> Result<()> {
        if self.list.is_empty() {
            return Ok(());
        }
        let id = self.list.id_at_display(self.row)?;
        let task = self.list.remove_task(id)?;
        self.copy_buffer = vec![CopiedTask {
            description: task.description,
            done: task.done,
        }];
        self.dirty = true;
        self.clamp_row();
        Ok(())
    }

    fn toggle_current(&mut self) -> Result<()> {
        if self.list.is_empty() {
            return Ok(());
        }
        let id = self.list.id_at_display(self.row)?;
        let done = self.list.toggle_completion(id)?;
        self.dirty = true;

        if done {
            // stay on the last pending row
            let last_pending = self.list.num_pending() as isize - 1;
            self.set_row(last_pending.min(self.row as isize));
        } else {
            self.move_down(1);
        }
        Ok(())
    }

    /// Insert fresh copies of the copy buffer next to the cursor's task.
    /// Returns false when there was nothing to paste.
    fn paste(&mut self, before: bool) -> Result<bool> {
        if self.copy_buffer.is_empty() {
            return Ok(false);
        }
        let anchor = if self.list.is_empty() {
            0
        } else {
            let raw = self.list.raw_index_of_display(self.row)?;
            if before { raw } else { raw + 1 }
        };

        for (i, copied) in self.copy_buffer.iter().enumerate() {
            let task = self.list.new_task(copied.description.clone(), copied.done)?;
            self.list.insert(task, anchor + i)?;
        }
        self.dirty = true;
        debug!(
            "Pasted {} tasks into {:?} at raw index {}",
            self.copy_buffer.len(),
            self.list.name(),
            anchor
        );
        Ok(true)
    }
}
