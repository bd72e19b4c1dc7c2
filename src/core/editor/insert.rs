//! Insert mode: one text field for a new or existing task.
//!
//! Keys bound to an Insert command win over text entry. Everything else goes
//! to the [`TextField`](super::text_field::TextField).

use super::{EditTarget, Editor, EditorMode, Effect};
use crate::core::error::Result;
use crate::core::keymap::InsertAction;

impl Editor {
    pub(super) fn handle_insert(&mut self, key: &str) -> Result<Effect> {
        match self.keymap.insert.action(key) {
            Some(InsertAction::Discard) => self.leave_insert(),
            Some(InsertAction::QuitNoWarning) => return Ok(Effect::Quit),
            Some(InsertAction::Save) => {
                if self.field.is_empty() {
                    self.leave_insert();
                } else {
                    self.save_field()?;
                }
            }
            None => {
                self.field.handle_key(key);
            }
        }
        Ok(Effect::None)
    }

    fn save_field(&mut self) -> Result<()> {
        let text = self.field.value();
        let id = match self.edit {
            Some(EditTarget::Create { location }) => {
                let raw = self.list.pending_insert_index(location);
                self.list.insert_new_task(text, raw)?
            }
            Some(EditTarget::Existing { id }) => {
                if self.list.task(id).is_some_and(|t| t.description == text) {
                    self.leave_insert();
                    return Ok(());
                }
                self.list.edit_description(id, text)?;
                id
            }
            None => {
                self.leave_insert();
                return Ok(());
            }
        };
        self.dirty = true;
        if let Some(row) = self.list.display_index_of(id) {
            self.row = row;
        }
        self.leave_insert();
        Ok(())
    }

    fn leave_insert(&mut self) {
        self.field.reset();
        self.edit = None;
        self.enter_mode(EditorMode::Normal);
    }
}
