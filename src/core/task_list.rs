//! # Task Lists
//!
//! A `TaskList` owns every `Task` of one named list plus the manual ordering.
//!
//! ```text
//! TaskList
//! ├── info: ListInfo            // name + cached counters
//! ├── order: Vec<TaskId>        // manual order, independent of completion
//! ├── tasks: HashMap<TaskId, Task>
//! └── used_ids: HashSet<TaskId> // always equal to the keys of `tasks`
//! ```
//!
//! ## Two index spaces
//!
//! The editor never shows `order` directly. It shows pending tasks (in manual
//! order) followed by done tasks (in manual order):
//!
//! ```text
//! order:    [a(done), b, c(done), d]
//! display:  [b, d, a, c]
//!            ^^^^  ^^^^
//!          pending  done
//! ```
//!
//! A *display index* is a position in that derived sequence, a *raw index* a
//! position in `order`. Anything that inserts or removes by position has to
//! go through [`display_order`] first.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::core::error::{Error, Result};

pub type TaskId = u64;

/// Number of random draws before id allocation gives up.
pub const MAX_ID_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub done: bool,
}

/// Name and counters of a list. The counters are derived from the task set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListInfo {
    pub name: String,
    pub num_done: usize,
    pub num_pending: usize,
    pub num_tasks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskList {
    info: ListInfo,
    order: Vec<TaskId>,
    tasks: HashMap<TaskId, Task>,
    used_ids: HashSet<TaskId>,
}

/// Pending ids followed by done ids, each group in manual order.
pub fn display_order(order: &[TaskId], tasks: &HashMap<TaskId, Task>) -> Vec<TaskId> {
    let is_done = |id: &&TaskId| tasks.get(*id).is_some_and(|t| t.done);
    let pending = order.iter().filter(|id| !is_done(id));
    let done = order.iter().filter(is_done);
    pending.chain(done).copied().collect()
}

impl TaskList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: ListInfo {
                name: name.into(),
                ..Default::default()
            },
            order: Vec::new(),
            tasks: HashMap::new(),
            used_ids: HashSet::new(),
        }
    }

    /// Rebuild a list from stored parts. `order` must be a permutation of
    /// the ids in `tasks`.
    pub fn from_parts(
        name: impl Into<String>,
        order: Vec<TaskId>,
        tasks: Vec<Task>,
    ) -> Result<Self> {
        let name = name.into();
        let mut by_id = HashMap::with_capacity(tasks.len());
        for task in tasks {
            let id = task.id;
            if by_id.insert(id, task).is_some() {
                return Err(Error::Validation(format!(
                    "task id {id} appears twice in list {name:?}"
                )));
            }
        }

        let mut seen = HashSet::with_capacity(order.len());
        for id in &order {
            if !seen.insert(*id) {
                return Err(Error::Validation(format!(
                    "task id {id} is ordered twice in list {name:?}"
                )));
            }
            if !by_id.contains_key(id) {
                return Err(Error::NotFound(format!("task {id} in list {name:?}")));
            }
        }
        if seen.len() != by_id.len() {
            return Err(Error::Validation(format!(
                "list {name:?} has tasks missing from its ordering"
            )));
        }

        let mut list = Self {
            info: ListInfo {
                name,
                ..Default::default()
            },
            order,
            tasks: by_id,
            used_ids: seen,
        };
        list.recount();
        Ok(list)
    }

    pub fn info(&self) -> &ListInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn len(&self) -> usize {
        self.info.num_tasks
    }

    pub fn is_empty(&self) -> bool {
        self.info.num_tasks == 0
    }

    pub fn num_pending(&self) -> usize {
        self.info.num_pending
    }

    pub fn num_done(&self) -> usize {
        self.info.num_done
    }

    /// Manual ordering of task ids.
    pub fn order(&self) -> &[TaskId] {
        &self.order
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Tasks in manual order.
    pub fn tasks_in_order(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    // ------------------------------------------------------------------
    // Id allocation
    // ------------------------------------------------------------------

    /// Create a detached task with a fresh id. Attach it with
    /// [`add_task`](Self::add_task) or [`insert`](Self::insert).
    pub fn new_task(&self, description: impl Into<String>, done: bool) -> Result<Task> {
        self.new_task_with(&mut rand::rng(), description, done)
    }

    pub fn new_task_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        description: impl Into<String>,
        done: bool,
    ) -> Result<Task> {
        let id = self.allocate_id(rng)?;
        Ok(Task {
            id,
            description: description.into(),
            done,
        })
    }

    fn allocate_id<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<TaskId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id: TaskId = rng.random();
            if !self.used_ids.contains(&id) {
                return Ok(id);
            }
        }
        Err(Error::Exhausted(format!(
            "no free task id in list {:?} after {MAX_ID_ATTEMPTS} attempts",
            self.info.name
        )))
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Append a task to the end of the manual order.
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if self.used_ids.contains(&task.id) {
            return Err(Error::AlreadyExists(format!(
                "task {} in list {:?}",
                task.id, self.info.name
            )));
        }
        self.order.push(task.id);
        self.attach(task);
        Ok(())
    }

    /// Insert a task at `raw_index` of the manual order (`0..=len`).
    pub fn insert(&mut self, task: Task, raw_index: usize) -> Result<()> {
        if raw_index > self.order.len() {
            return Err(Error::Validation(format!(
                "insert index {raw_index} out of range for list {:?} of {} tasks",
                self.info.name,
                self.order.len()
            )));
        }
        if self.used_ids.contains(&task.id) {
            return Err(Error::Validation(format!(
                "task {} is already in list {:?}",
                task.id, self.info.name
            )));
        }
        self.order.insert(raw_index, task.id);
        self.attach(task);
        Ok(())
    }

    pub fn add_new_task(&mut self, description: impl Into<String>, done: bool) -> Result<TaskId> {
        let task = self.new_task(description, done)?;
        let id = task.id;
        self.add_task(task)?;
        Ok(id)
    }

    /// Create a pending task at `raw_index`.
    pub fn insert_new_task(
        &mut self,
        description: impl Into<String>,
        raw_index: usize,
    ) -> Result<TaskId> {
        let task = self.new_task(description, false)?;
        let id = task.id;
        self.insert(task, raw_index)?;
        Ok(id)
    }

    fn attach(&mut self, task: Task) {
        self.used_ids.insert(task.id);
        self.info.num_tasks += 1;
        if task.done {
            self.info.num_done += 1;
        } else {
            self.info.num_pending += 1;
        }
        self.tasks.insert(task.id, task);
        self.debug_check();
    }

    pub fn remove_task(&mut self, id: TaskId) -> Result<Task> {
        let task = self.tasks.remove(&id).ok_or_else(|| self.missing(id))?;
        self.order.retain(|t| *t != id);
        self.used_ids.remove(&id);
        self.info.num_tasks -= 1;
        if task.done {
            self.info.num_done -= 1;
        } else {
            self.info.num_pending -= 1;
        }
        self.debug_check();
        Ok(task)
    }

    pub fn edit_description(&mut self, id: TaskId, text: impl Into<String>) -> Result<()> {
        let missing = self.missing(id);
        let task = self.tasks.get_mut(&id).ok_or(missing)?;
        task.description = text.into();
        Ok(())
    }

    /// Flip `done` on a task. Returns the new state.
    pub fn toggle_completion(&mut self, id: TaskId) -> Result<bool> {
        let missing = self.missing(id);
        let task = self.tasks.get_mut(&id).ok_or(missing)?;
        task.done = !task.done;
        let done = task.done;
        if done {
            self.info.num_done += 1;
            self.info.num_pending -= 1;
        } else {
            self.info.num_done -= 1;
            self.info.num_pending += 1;
        }
        self.debug_check();
        Ok(done)
    }

    /// Drop every done task. Returns how many were removed.
    pub fn remove_done(&mut self) -> usize {
        let done: Vec<TaskId> = self
            .order
            .iter()
            .copied()
            .filter(|id| self.tasks.get(id).is_some_and(|t| t.done))
            .collect();
        for id in &done {
            self.tasks.remove(id);
            self.used_ids.remove(id);
        }
        self.order.retain(|id| self.tasks.contains_key(id));
        self.recount();
        done.len()
    }

    /// Recompute the cached counters from the task set.
    pub fn recount(&mut self) {
        let num_done = self.tasks.values().filter(|t| t.done).count();
        self.info.num_tasks = self.tasks.len();
        self.info.num_done = num_done;
        self.info.num_pending = self.tasks.len() - num_done;
    }

    fn missing(&self, id: TaskId) -> Error {
        Error::NotFound(format!("task {id} in list {:?}", self.info.name))
    }

    // ------------------------------------------------------------------
    // Display mapping
    // ------------------------------------------------------------------

    pub fn display_order(&self) -> Vec<TaskId> {
        display_order(&self.order, &self.tasks)
    }

    /// (pending, done), each in manual order.
    pub fn split_by_completion(&self) -> (Vec<&Task>, Vec<&Task>) {
        self.tasks_in_order().partition(|t| !t.done)
    }

    pub fn id_at_display(&self, display_index: usize) -> Result<TaskId> {
        self.display_order()
            .get(display_index)
            .copied()
            .ok_or_else(|| {
                Error::Validation(format!(
                    "display index {display_index} out of range for list {:?} of {} tasks",
                    self.info.name, self.info.num_tasks
                ))
            })
    }

    pub fn task_at_display(&self, display_index: usize) -> Result<&Task> {
        let id = self.id_at_display(display_index)?;
        self.tasks.get(&id).ok_or_else(|| self.missing(id))
    }

    pub fn raw_index_of(&self, id: TaskId) -> Result<usize> {
        self.order
            .iter()
            .position(|t| *t == id)
            .ok_or_else(|| self.missing(id))
    }

    pub fn raw_index_of_display(&self, display_index: usize) -> Result<usize> {
        let id = self.id_at_display(display_index)?;
        self.raw_index_of(id)
    }

    pub fn display_index_of(&self, id: TaskId) -> Option<usize> {
        self.display_order().iter().position(|t| *t == id)
    }

    /// Raw index at which a new pending task shows up at display `location`.
    ///
    /// `location` is clamped to the pending partition. Past the last pending
    /// task the new one goes right after it in manual order, or at the end
    /// when nothing is pending.
    pub fn pending_insert_index(&self, location: usize) -> usize {
        let pending: Vec<usize> = self
            .order
            .iter()
            .enumerate()
            .filter(|(_, id)| self.tasks.get(*id).is_some_and(|t| !t.done))
            .map(|(raw, _)| raw)
            .collect();
        match pending.get(location) {
            Some(raw) => *raw,
            None => pending.last().map_or(self.order.len(), |raw| raw + 1),
        }
    }

    // ------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------

    pub fn check_invariants(&self) -> Result<()> {
        let broken = |what: &str| {
            Err(Error::Validation(format!(
                "list {:?} is inconsistent: {what}",
                self.info.name
            )))
        };
        let unique: HashSet<&TaskId> = self.order.iter().collect();
        if unique.len() != self.order.len() {
            return broken("duplicate ids in order");
        }
        let missing_task = |id: &TaskId| !self.tasks.contains_key(id);
        if self.order.len() != self.tasks.len() || self.order.iter().any(missing_task) {
            return broken("order is not a permutation of the tasks");
        }
        if self.used_ids.len() != self.tasks.len() || self.used_ids.iter().any(missing_task) {
            return broken("used ids differ from task ids");
        }
        let num_done = self.tasks.values().filter(|t| t.done).count();
        if self.info.num_tasks != self.tasks.len()
            || self.info.num_done != num_done
            || self.info.num_done + self.info.num_pending != self.info.num_tasks
        {
            return broken("counters out of date");
        }
        if self.tasks.iter().any(|(id, t)| *id != t.id) {
            return broken("task filed under the wrong id");
        }
        Ok(())
    }

    fn debug_check(&self) {
        debug_assert!(
            self.check_invariants().is_ok(),
            "{:?}",
            self.check_invariants()
        );
    }
}
