//! # Modal Editor
//!
//! The interactive state machine behind `listly open`. Every key press goes
//! through [`Editor::handle_key`], which looks the key up in the current
//! mode's bindings and mutates the owned `TaskList`.
//!
//! ```text
//!              v (non-empty)             n / O / o / i / x
//!   ┌────────┐ ─────────────► ┌────────┐ ◄──────── ┌────────┐
//!   │ Visual │                │ Normal │           │ Insert │
//!   └────────┘ ◄───────────── └────────┘ ────────► └────────┘
//!          esc / y / d / space     │     esc / enter
//!                                  │ q (dirty)
//!                                  ▼
//!                           ┌─────────────┐  y / enter → Quit
//!                           │ ConfirmQuit │  n         → Normal
//!                           └─────────────┘
//! ```
//!
//! Editor state:
//!
//! ```text
//! Editor
//! ├── list: TaskList          // the only copy, owned
//! ├── keymap: KeyMap          // resolved once, passed in
//! ├── mode: EditorMode
//! ├── confirm_quit: bool      // overlay on Normal
//! ├── row: usize              // display index, 0..len
//! ├── sel_start: Option<usize>// Visual anchor
//! ├── dirty: bool             // cleared by a successful write
//! ├── copy_buffer: Vec<CopiedTask>
//! ├── edit: Option<EditTarget>
//! └── field: TextField
//! ```
//!
//! The cursor is always a display index. Anything that touches `order`
//! translates through the list's display mapping at the moment of the action.
//!
//! ## Modules
//!
//! - [`normal`]: Normal-mode actions (navigation, cut/yank/paste, write)
//! - [`insert`]: Insert-mode save/discard and text entry
//! - [`visual`]: range actions
//! - [`text_field`]: the single-line input used by Insert mode

mod insert;
mod normal;
pub mod text_field;
mod visual;

use log::debug;

use crate::core::error::Result;
use crate::core::keymap::KeyMap;
use crate::core::task_list::{TaskId, TaskList};

use text_field::TextField;

/// Where a list goes when the user writes.
pub trait ListSink {
    fn save_list(&mut self, list: &TaskList) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Normal,
    Insert,
    Visual,
}

/// What the session loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
}

/// Value snapshot held by the copy buffer. Pasting mints a fresh id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedTask {
    pub description: String,
    pub done: bool,
}

/// What Insert mode is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// New pending task shown at display index `location`.
    Create { location: usize },
    Existing { id: TaskId },
}

pub struct Editor {
    list: TaskList,
    keymap: KeyMap,
    mode: EditorMode,
    confirm_quit: bool,
    row: usize,
    sel_start: Option<usize>,
    dirty: bool,
    copy_buffer: Vec<CopiedTask>,
    edit: Option<EditTarget>,
    field: TextField,
}

impl Editor {
    pub fn new(list: TaskList, keymap: KeyMap) -> Self {
        Self {
            list,
            keymap,
            mode: EditorMode::Normal,
            confirm_quit: false,
            row: 0,
            sel_start: None,
            dirty: false,
            copy_buffer: Vec::new(),
            edit: None,
            field: TextField::default(),
        }
    }

    /// Process one key. Errors are fatal to the session.
    pub fn handle_key(&mut self, key: &str, sink: &mut dyn ListSink) -> Result<Effect> {
        if self.confirm_quit {
            return Ok(self.handle_confirm(key));
        }
        let effect = match self.mode {
            EditorMode::Normal => self.handle_normal(key, sink)?,
            EditorMode::Insert => self.handle_insert(key)?,
            EditorMode::Visual => self.handle_visual(key)?,
        };
        self.clamp_row();
        Ok(effect)
    }

    fn handle_confirm(&mut self, key: &str) -> Effect {
        match key {
            "y" | "enter" => {
                debug!("Quit confirmed, discarding changes to {:?}", self.list.name());
                Effect::Quit
            }
            "n" => {
                self.confirm_quit = false;
                Effect::None
            }
            _ => Effect::None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn list(&self) -> &TaskList {
        &self.list
    }

    pub fn into_list(self) -> TaskList {
        self.list
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn confirming_quit(&self) -> bool {
        self.confirm_quit
    }

    pub fn row(&self) -> usize {
        self.row
    }

    /// Inclusive display range under Visual selection.
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.sel_start
            .map(|start| (start.min(self.row), start.max(self.row)))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn copy_buffer(&self) -> &[CopiedTask] {
        &self.copy_buffer
    }

    pub fn edit_target(&self) -> Option<EditTarget> {
        self.edit
    }

    pub fn field(&self) -> &TextField {
        &self.field
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    fn last_row(&self) -> usize {
        self.list.len().saturating_sub(1)
    }

    fn clamp_row(&mut self) {
        self.row = self.row.min(self.last_row());
    }

    fn set_row(&mut self, row: isize) {
        self.row = row.clamp(0, self.last_row() as isize) as usize;
    }

    fn move_up(&mut self, by: usize) {
        self.row = self.row.saturating_sub(by);
    }

    fn move_down(&mut self, by: usize) {
        self.row = (self.row + by).min(self.last_row());
    }

    /// Toward the top, stopping at the partition boundary on the way.
    fn jump_up(&mut self) {
        let boundary = self.list.num_pending();
        let row = if self.row == boundary {
            boundary as isize - 1
        } else if self.row > boundary {
            boundary as isize
        } else {
            0
        };
        self.set_row(row);
    }

    /// Toward the bottom, stopping at the last pending row and the first
    /// done row on the way.
    fn jump_down(&mut self) {
        let last_pending = self.list.num_pending() as isize - 1;
        let row = self.row as isize;
        let target = if row < last_pending {
            last_pending
        } else if row == last_pending {
            last_pending + 1
        } else {
            self.list.len() as isize - 1
        };
        self.set_row(target);
    }

    fn copy_range(&self, start: usize, end: usize) -> Result<Vec<CopiedTask>> {
        (start..=end)
            .map(|i| {
                let task = self.list.task_at_display(i)?;
                Ok(CopiedTask {
                    description: task.description.clone(),
                    done: task.done,
                })
            })
            .collect()
    }

    fn enter_mode(&mut self, mode: EditorMode) {
        debug!("Editor mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }
}
