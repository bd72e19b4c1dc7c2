//! Property tests for the list model and the editor.
//!
//! 1. Any sequence of model mutations keeps the counters consistent and the
//!    display order a stable pending/done partition of the manual order.
//! 2. Any sequence of keys keeps the cursor and the selection in range and
//!    never surfaces a list error.

use proptest::prelude::*;

use listly::core::editor::{Editor, Effect, ListSink};
use listly::core::error::Result;
use listly::core::keymap::KeyMap;
use listly::core::task_list::TaskList;

struct NullSink;

impl ListSink for NullSink {
    fn save_list(&mut self, _list: &TaskList) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Mutation {
    Add(bool),
    Insert(usize),
    Remove(usize),
    Toggle(usize),
    RemoveDone,
}

fn arb_mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        any::<bool>().prop_map(Mutation::Add),
        (0usize..16).prop_map(Mutation::Insert),
        (0usize..16).prop_map(Mutation::Remove),
        (0usize..16).prop_map(Mutation::Toggle),
        Just(Mutation::RemoveDone),
    ]
}

/// Keys from every default table plus a few characters for Insert mode.
fn arb_key() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "j", "k", "J", "K", "{", "}", " ", "n", "o", "O", "i", "x", "d", "y", "p", "P", "v",
        "w", "q", "esc", "enter", "backspace", "left", "a", "b", "z",
    ])
}

fn apply(list: &mut TaskList, mutation: &Mutation) {
    let len = list.len();
    match *mutation {
        Mutation::Add(done) => {
            list.add_new_task("task", done).unwrap();
        }
        Mutation::Insert(at) => {
            list.insert_new_task("inserted", at.min(len)).unwrap();
        }
        Mutation::Remove(at) if len > 0 => {
            let id = list.order()[at % len];
            list.remove_task(id).unwrap();
        }
        Mutation::Toggle(at) if len > 0 => {
            let id = list.order()[at % len];
            list.toggle_completion(id).unwrap();
        }
        Mutation::RemoveDone => {
            list.remove_done();
        }
        _ => {}
    }
}

proptest! {
    #[test]
    fn mutations_keep_list_consistent(mutations in prop::collection::vec(arb_mutation(), 0..64)) {
        let mut list = TaskList::new("props");
        for mutation in &mutations {
            apply(&mut list, mutation);
            prop_assert!(list.check_invariants().is_ok());
        }

        let display = list.display_order();
        prop_assert_eq!(display.len(), list.len());
        let np = list.num_pending();
        for (i, id) in display.iter().enumerate() {
            let done = list.task(*id).unwrap().done;
            prop_assert_eq!(done, i >= np);
            prop_assert_eq!(list.display_index_of(*id), Some(i));
        }

        let pending: Vec<_> = list
            .order()
            .iter()
            .copied()
            .filter(|id| !list.task(*id).unwrap().done)
            .collect();
        prop_assert_eq!(&display[..np], pending.as_slice());
    }

    #[test]
    fn keys_never_break_the_editor(
        start in prop::collection::vec(any::<bool>(), 0..8),
        keys in prop::collection::vec(arb_key(), 0..128),
    ) {
        let mut list = TaskList::new("props");
        for (i, done) in start.iter().enumerate() {
            list.add_new_task(format!("task {i}"), *done).unwrap();
        }
        let mut editor = Editor::new(list, KeyMap::defaults().unwrap());

        for key in keys {
            let effect = editor.handle_key(key, &mut NullSink);
            prop_assert!(effect.is_ok(), "key {:?} failed: {:?}", key, effect.as_ref().err());
            if matches!(effect, Ok(Effect::Quit)) {
                break;
            }

            let list = editor.list();
            prop_assert!(list.check_invariants().is_ok());
            prop_assert!(editor.row() <= list.len().saturating_sub(1));
            if let Some((start, end)) = editor.selection() {
                prop_assert!(start <= end);
                prop_assert!(end < list.len().max(1));
            }
        }
    }
}
