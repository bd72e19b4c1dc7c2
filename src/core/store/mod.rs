//! # Store
//!
//! Durable home of every list, on SQLite used as a key-value store.
//!
//! ```text
//! meta                          lists
//! ┌─────────────┬───────────┐   ┌────────────┬──────────────────────┬───────┐
//! │ currentList │ "Work"    │   │ list       │ key                  │ value │
//! │ keymapPath  │ "/k.toml" │   ├────────────┼──────────────────────┼───────┤
//! └─────────────┴───────────┘   │ "Work"     │ info/name            │ …     │
//!                               │ "Work"     │ info/numDone         │ …     │
//!                               │ "Work"     │ data/taskIds         │ …     │
//!                               │ "Work"     │ data/tasks/<id>/done │ …     │
//!                               └────────────┴──────────────────────┴───────┘
//! ```
//!
//! Record layout is in [`codec`]. Every public operation runs in one
//! transaction; a failing step rolls the whole operation back.

pub mod codec;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params};

use crate::core::config;
use crate::core::editor::ListSink;
use crate::core::error::{Error, Result};
use crate::core::task_list::{ListInfo, Task, TaskList};

use codec::TaskField;

pub const DB_FILE: &str = "listly.db";

const CURRENT_LIST: &str = "currentList";
const KEYMAP_PATH: &str = "keymapPath";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS meta (
        key   TEXT PRIMARY KEY,
        value BLOB NOT NULL
    );
    CREATE TABLE IF NOT EXISTS lists (
        list  TEXT NOT NULL,
        key   BLOB NOT NULL,
        value BLOB NOT NULL,
        PRIMARY KEY (list, key)
    );
";

pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (or create) the database inside `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(DB_FILE);
        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        info!("Opened store at {}", path.display());
        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Open the store in the default data directory.
    pub fn open_default() -> Result<Self> {
        let dir = config::default_data_dir()
            .ok_or_else(|| Error::NotFound("user configuration directory".to_string()))?;
        Self::open(&dir)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ------------------------------------------------------------------
    // Session metadata
    // ------------------------------------------------------------------

    /// Name of the current list, or "" when unset.
    pub fn current_list_name(&self) -> Result<String> {
        match get_meta(&self.conn, CURRENT_LIST)? {
            Some(bytes) => codec::decode_text(bytes),
            None => Ok(String::new()),
        }
    }

    pub fn set_current_list_name(&mut self, name: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        set_current(&tx, name)?;
        tx.commit()?;
        debug!("Current list is now {:?}", name);
        Ok(())
    }

    pub fn keymap_path(&self) -> Result<Option<PathBuf>> {
        match get_meta(&self.conn, KEYMAP_PATH)? {
            Some(bytes) => Ok(Some(PathBuf::from(codec::decode_text(bytes)?))),
            None => Ok(None),
        }
    }

    /// Remember the key-binding override file. An empty path clears it.
    pub fn set_keymap_path(&mut self, path: &str) -> Result<()> {
        if path.is_empty() {
            self.conn
                .execute("DELETE FROM meta WHERE key = ?1", params![KEYMAP_PATH])?;
            info!("Cleared stored key binding path");
        } else {
            put_meta(&self.conn, KEYMAP_PATH, path.as_bytes())?;
            info!("Stored key binding path {}", path);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn list_exists(&self, name: &str) -> Result<bool> {
        list_exists(&self.conn, name)
    }

    pub fn list_names(&self) -> Result<BTreeSet<String>> {
        list_names(&self.conn)
    }

    /// Stored info record of every list.
    pub fn info(&self) -> Result<BTreeMap<String, ListInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT list, key, value FROM lists WHERE key IN (?1, ?2, ?3, ?4)",
        )?;
        let rows = stmt.query_map(
            params![
                codec::INFO_NAME,
                codec::INFO_NUM_DONE,
                codec::INFO_NUM_PENDING,
                codec::INFO_NUM_TASKS
            ],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                ))
            },
        )?;

        let mut infos: BTreeMap<String, ListInfo> = BTreeMap::new();
        for row in rows {
            let (list, key, value) = row?;
            let info = infos.entry(list).or_default();
            match key.as_slice() {
                codec::INFO_NAME => info.name = codec::decode_text(value)?,
                codec::INFO_NUM_DONE => info.num_done = to_count(codec::decode_u64(&value)?),
                codec::INFO_NUM_PENDING => info.num_pending = to_count(codec::decode_u64(&value)?),
                codec::INFO_NUM_TASKS => info.num_tasks = to_count(codec::decode_u64(&value)?),
                _ => {}
            }
        }
        Ok(infos)
    }

    pub fn get_list(&self, name: &str) -> Result<TaskList> {
        read_list(&self.conn, name)
    }

    pub fn load(&self, name: &str) -> Result<TaskList> {
        self.get_list(name)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Replace every stored record of the list. Counters are recomputed.
    pub fn save_list(&mut self, list: &TaskList) -> Result<()> {
        let tx = self.conn.transaction()?;
        write_list(&tx, list)?;
        tx.commit()?;
        info!(
            "Saved list {:?} ({} tasks, {} done)",
            list.name(),
            list.len(),
            list.num_done()
        );
        Ok(())
    }

    pub fn save(&mut self, list: &TaskList) -> Result<()> {
        self.save_list(list)
    }

    /// Add lists that must not exist yet. Nothing is written if any name
    /// is taken.
    pub fn merge_generated(&mut self, lists: &[TaskList]) -> Result<()> {
        let tx = self.conn.transaction()?;
        let mut seen = HashSet::new();
        for list in lists {
            if !seen.insert(list.name()) || list_exists(&tx, list.name())? {
                return Err(Error::AlreadyExists(format!("list {:?}", list.name())));
            }
            write_list(&tx, list)?;
        }
        tx.commit()?;
        info!("Merged {} new lists", lists.len());
        Ok(())
    }

    /// Copy every record of `old` under `new`, drop `old`, and repoint the
    /// current list.
    pub fn rename_list(&mut self, old: &str, new: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        if !list_exists(&tx, old)? {
            return Err(Error::NotFound(format!("list {old:?}")));
        }
        if list_exists(&tx, new)? {
            return Err(Error::AlreadyExists(format!("list {new:?}")));
        }

        tx.execute(
            "INSERT INTO lists (list, key, value) SELECT ?2, key, value FROM lists WHERE list = ?1",
            params![old, new],
        )?;
        tx.execute("DELETE FROM lists WHERE list = ?1", params![old])?;
        write_name(&tx, new)?;

        if current(&tx)? == old {
            set_current(&tx, new)?;
        }
        tx.commit()?;
        info!("Renamed list {:?} to {:?}", old, new);
        Ok(())
    }

    /// Remove the named lists, skipping unknown names. Returns how many
    /// were removed.
    pub fn delete_lists<S: AsRef<str>>(&mut self, names: &[S]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let current = current(&tx)?;
        let mut removed = 0;
        for name in names {
            let name = name.as_ref();
            if tx.execute("DELETE FROM lists WHERE list = ?1", params![name])? > 0 {
                removed += 1;
                if name == current {
                    clear_current(&tx)?;
                }
            }
        }
        tx.commit()?;
        info!("Deleted {} lists", removed);
        Ok(removed)
    }

    pub fn delete_all_lists(&mut self) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let removed = list_names(&tx)?.len();
        tx.execute("DELETE FROM lists", [])?;
        clear_current(&tx)?;
        tx.commit()?;
        info!("Deleted all {} lists", removed);
        Ok(removed)
    }

    /// Drop done tasks from the named lists, skipping unknown names.
    /// Returns the total removed.
    pub fn clean_lists<S: AsRef<str>>(&mut self, names: &[S]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let removed = clean_in(&tx, names)?;
        tx.commit()?;
        Ok(removed)
    }

    pub fn clean_all_lists(&mut self) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let names: Vec<String> = list_names(&tx)?.into_iter().collect();
        let removed = clean_in(&tx, &names)?;
        tx.commit()?;
        Ok(removed)
    }

    /// No-op when there is no current list.
    pub fn clean_current_list(&mut self) -> Result<usize> {
        let current = self.current_list_name()?;
        if current.is_empty() {
            return Ok(0);
        }
        self.clean_lists(&[current])
    }
}

impl ListSink for Store {
    fn save_list(&mut self, list: &TaskList) -> Result<()> {
        Store::save_list(self, list)
    }
}

// ============================================================================
// Statement helpers, shared by plain connections and transactions
// ============================================================================

fn to_count(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

fn get_meta(conn: &Connection, key: &str) -> Result<Option<Vec<u8>>> {
    Ok(conn
        .query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| row.get(0))
        .optional()?)
}

fn put_meta(conn: &Connection, key: &str, value: &[u8]) -> Result<()> {
    conn.execute(
        "INSERT INTO meta (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn current(conn: &Connection) -> Result<String> {
    match get_meta(conn, CURRENT_LIST)? {
        Some(bytes) => codec::decode_text(bytes),
        None => Ok(String::new()),
    }
}

fn set_current(conn: &Connection, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("current list name cannot be empty".to_string()));
    }
    put_meta(conn, CURRENT_LIST, name.as_bytes())
}

fn clear_current(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM meta WHERE key = ?1", params![CURRENT_LIST])?;
    Ok(())
}

fn list_exists(conn: &Connection, name: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM lists WHERE list = ?1 AND key = ?2",
            params![name, codec::INFO_NAME],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn clean_in<S: AsRef<str>>(conn: &Connection, names: &[S]) -> Result<usize> {
    let mut removed = 0;
    for name in names {
        let name = name.as_ref();
        if !list_exists(conn, name)? {
            continue;
        }
        let mut list = read_list(conn, name)?;
        let n = list.remove_done();
        if n > 0 {
            write_list(conn, &list)?;
        }
        debug!("Cleaned {} done tasks from {:?}", n, name);
        removed += n;
    }
    Ok(removed)
}

fn list_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT list FROM lists")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<BTreeSet<_>>>()?;
    Ok(names)
}

fn put(conn: &Connection, list: &str, key: &[u8], value: &[u8]) -> Result<()> {
    conn.execute(
        "INSERT INTO lists (list, key, value) VALUES (?1, ?2, ?3)
         ON CONFLICT(list, key) DO UPDATE SET value = excluded.value",
        params![list, key, value],
    )?;
    Ok(())
}

fn write_name(conn: &Connection, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("list name cannot be empty".to_string()));
    }
    put(conn, name, codec::INFO_NAME, name.as_bytes())
}

fn write_list(conn: &Connection, list: &TaskList) -> Result<()> {
    let name = list.name();
    write_name(conn, name)?;
    conn.execute(
        "DELETE FROM lists WHERE list = ?1 AND key != ?2",
        params![name, codec::INFO_NAME],
    )?;

    let tasks: Vec<&Task> = list.tasks_in_order().collect();
    let num_done = tasks.iter().filter(|t| t.done).count() as u64;
    let num_tasks = tasks.len() as u64;
    put(conn, name, codec::INFO_NUM_DONE, &codec::encode_u64(num_done))?;
    put(conn, name, codec::INFO_NUM_PENDING, &codec::encode_u64(num_tasks - num_done))?;
    put(conn, name, codec::INFO_NUM_TASKS, &codec::encode_u64(num_tasks))?;

    put(conn, name, codec::TASK_IDS, &codec::encode_ids(list.order()))?;
    for task in tasks {
        put(conn, name, &codec::task_key(task.id, TaskField::Id), &codec::encode_u64(task.id))?;
        put(
            conn,
            name,
            &codec::task_key(task.id, TaskField::Description),
            task.description.as_bytes(),
        )?;
        put(
            conn,
            name,
            &codec::task_key(task.id, TaskField::Done),
            &codec::encode_bool(task.done),
        )?;
    }
    Ok(())
}

fn read_list(conn: &Connection, name: &str) -> Result<TaskList> {
    let mut stmt = conn.prepare("SELECT key, value FROM lists WHERE list = ?1")?;
    let mut records: HashMap<Vec<u8>, Vec<u8>> = stmt
        .query_map(params![name], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<_>>()?;

    let stored_name = records
        .remove(codec::INFO_NAME)
        .ok_or_else(|| Error::NotFound(format!("list {name:?}")))?;
    let stored_name = codec::decode_text(stored_name)?;

    let order = records
        .get(codec::TASK_IDS)
        .map(|bytes| codec::decode_ids(bytes))
        .transpose()?
        .unwrap_or_default();

    let mut tasks = Vec::with_capacity(order.len());
    for &id in &order {
        let mut field = |f: TaskField| {
            records.remove(&codec::task_key(id, f)).ok_or_else(|| {
                Error::NotFound(format!("{f:?} record of task {id} in list {name:?}"))
            })
        };
        let stored_id = codec::decode_u64(&field(TaskField::Id)?)?;
        let description = codec::decode_text(field(TaskField::Description)?)?;
        let done = codec::decode_bool(&field(TaskField::Done)?)?;
        tasks.push(Task {
            id: stored_id,
            description,
            done,
        });
    }

    TaskList::from_parts(stored_name, order, tasks)
}
