//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use rand::RngCore;

use crate::core::editor::{Editor, Effect, ListSink};
use crate::core::error::{Error, Result};
use crate::core::keymap::KeyMap;
use crate::core::task_list::{Task, TaskList};

/// A random source that always yields the same value.
pub struct FixedRng(pub u64);

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        self.0 as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for (d, s) in dst.iter_mut().zip(self.0.to_le_bytes().iter().cycle()) {
            *d = *s;
        }
    }
}

/// A list named "test" holding the given tasks in manual order.
pub fn list_with(tasks: &[(&str, bool)]) -> TaskList {
    let mut list = TaskList::new("test");
    for (description, done) in tasks {
        list.add_new_task(*description, *done).unwrap();
    }
    list
}

pub fn descriptions<'a>(tasks: &[&'a Task]) -> Vec<&'a str> {
    tasks.iter().map(|t| t.description.as_str()).collect()
}

/// Descriptions in display order (pending first).
pub fn displayed(list: &TaskList) -> Vec<String> {
    list.display_order()
        .iter()
        .map(|id| list.task(*id).unwrap().description.clone())
        .collect()
}

/// Records every saved list.
#[derive(Default)]
pub struct MemorySink {
    pub saved: Vec<TaskList>,
}

impl ListSink for MemorySink {
    fn save_list(&mut self, list: &TaskList) -> Result<()> {
        self.saved.push(list.clone());
        Ok(())
    }
}

/// Rejects every write.
pub struct FailingSink;

impl ListSink for FailingSink {
    fn save_list(&mut self, _list: &TaskList) -> Result<()> {
        Err(Error::Io(std::io::Error::other("disk full")))
    }
}

pub fn editor_with(tasks: &[(&str, bool)]) -> Editor {
    Editor::new(list_with(tasks), KeyMap::defaults().unwrap())
}

/// Feed keys to the editor, returning the last effect.
pub fn press(editor: &mut Editor, keys: &[&str]) -> Effect {
    let mut sink = MemorySink::default();
    let mut effect = Effect::None;
    for key in keys {
        effect = editor.handle_key(key, &mut sink).unwrap();
    }
    effect
}

/// Type text into the insert field one character at a time.
pub fn type_text(editor: &mut Editor, text: &str) {
    let mut sink = MemorySink::default();
    for c in text.chars() {
        editor.handle_key(&c.to_string(), &mut sink).unwrap();
    }
}
