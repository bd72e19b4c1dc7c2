//! # Command Line
//!
//! One subcommand per store operation. With no subcommand the current list
//! opens in the editor.
//!
//! ```text
//! listly new Work Home        create, "Home" becomes current
//! listly list                 names with counts, current marked
//! listly show [name]          print tasks, pending first
//! listly open [name]          interactive editor
//! listly switch <name>
//! listly rename <old> <new>
//! listly delete <names..> | --all
//! listly clean [names..] | --all
//! listly import <file>
//! listly export <file> [names..]
//! listly kmap show | set <file> | clear
//! ```
//!
//! Output goes to the writer handed to [`run`]; failures come back as
//! [`Error`] and the binary prints them as `Abort! <message>`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;

use crate::core::config::{CliOverrides, ResolvedConfig};
use crate::core::editor::Editor;
use crate::core::error::{Error, Result};
use crate::core::keymap::{Command as KeyCommand, ModeBindings, display_key, load_keymap};
use crate::core::store::Store;
use crate::core::task_list::TaskList;
use crate::core::transfer::{self, FileFormat};
use crate::tui;

#[derive(Debug, Parser)]
#[command(
    name = "listly",
    version,
    about = "Manage todo lists from the command line",
    long_about = "Create and manage named todo lists with short commands, \
                  and edit them in a terminal UI with vim-style key bindings."
)]
pub struct Cli {
    /// Directory holding the database and the log
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Key binding file for this run
    #[arg(long, global = true, value_name = "FILE")]
    pub keymap: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            data_dir: self.data_dir.clone(),
            keymap: self.keymap.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create new lists; the last one becomes current
    New {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Show every list with its task counts
    List,
    /// Print the tasks of a list (default: current)
    Show { name: Option<String> },
    /// Edit a list in the terminal UI (default: current)
    Open { name: Option<String> },
    /// Make another list current
    Switch { name: String },
    /// Rename a list
    Rename { old: String, new: String },
    /// Delete lists
    Delete {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        names: Vec<String>,
        /// Delete every list
        #[arg(short, long)]
        all: bool,
    },
    /// Remove completed tasks (default: current list)
    Clean {
        #[arg(conflicts_with = "all")]
        names: Vec<String>,
        /// Clean every list
        #[arg(short, long)]
        all: bool,
    },
    /// Add lists from a .json or .yaml file
    Import { file: PathBuf },
    /// Write lists to a .json or .yaml file (default: current)
    Export { file: PathBuf, names: Vec<String> },
    /// Manage the key binding file
    Kmap {
        #[command(subcommand)]
        command: KmapCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum KmapCommand {
    /// Show the key binding file in use and every effective binding
    Show,
    /// Use this file for key bindings from now on
    Set { file: PathBuf },
    /// Go back to the default bindings (the file is left alone)
    Clear,
}

/// Execute one command against the store.
pub fn run(
    command: Option<Command>,
    store: &mut Store,
    config: &ResolvedConfig,
    out: &mut dyn Write,
) -> Result<()> {
    let Some(command) = command else {
        return open(store, config, None);
    };

    match command {
        Command::New { names } => new_lists(store, &names, out),
        Command::List => list_lists(store, out),
        Command::Show { name } => show(store, name, out),
        Command::Open { name } => open(store, config, name),
        Command::Switch { name } => {
            require_list(store, &name)?;
            store.set_current_list_name(&name)?;
            writeln!(out, "Switched to \"{name}\".")?;
            Ok(())
        }
        Command::Rename { old, new } => {
            if new.is_empty() {
                return Err(Error::Validation("list name cannot be empty".to_string()));
            }
            store.rename_list(&old, &new)?;
            writeln!(out, "Renamed \"{old}\" to \"{new}\".")?;
            Ok(())
        }
        Command::Delete { names, all } => {
            let removed = if all {
                store.delete_all_lists()?
            } else {
                for name in &names {
                    require_list(store, name)?;
                }
                store.delete_lists(names.as_slice())?
            };
            writeln!(out, "Deleted {removed} {}.", plural(removed, "list"))?;
            Ok(())
        }
        Command::Clean { names, all } => {
            let removed = if all {
                store.clean_all_lists()?
            } else if names.is_empty() {
                current_name(store)?;
                store.clean_current_list()?
            } else {
                for name in &names {
                    require_list(store, name)?;
                }
                store.clean_lists(names.as_slice())?
            };
            writeln!(out, "Removed {removed} completed {}.", plural(removed, "task"))?;
            Ok(())
        }
        Command::Import { file } => import(store, &file, out),
        Command::Export { file, names } => export(store, &file, names, out),
        Command::Kmap { command } => kmap(store, config, command, out),
    }
}

fn new_lists(store: &mut Store, names: &[String], out: &mut dyn Write) -> Result<()> {
    for name in names {
        if name.is_empty() {
            return Err(Error::Validation("list name cannot be empty".to_string()));
        }
        if store.list_exists(name)? {
            return Err(Error::AlreadyExists(format!("list \"{name}\"")));
        }
    }
    let lists: Vec<TaskList> = names.iter().map(TaskList::new).collect();
    store.merge_generated(&lists)?;
    if let Some(last) = names.last() {
        store.set_current_list_name(last)?;
    }

    writeln!(out, "Created new todo lists:")?;
    for name in names {
        writeln!(out, "  - {name}")?;
    }
    Ok(())
}

fn list_lists(store: &Store, out: &mut dyn Write) -> Result<()> {
    let infos = store.info()?;
    if infos.is_empty() {
        writeln!(out, "No lists yet. Create one with `listly new <name>`.")?;
        return Ok(());
    }
    let current = store.current_list_name()?;
    let width = infos.keys().map(|n| n.chars().count()).max().unwrap_or(0);
    for (name, info) in &infos {
        let marker = if *name == current { '*' } else { ' ' };
        writeln!(
            out,
            "{marker} {name:<width$}  {}/{} done",
            info.num_done, info.num_tasks
        )?;
    }
    Ok(())
}

fn show(store: &Store, name: Option<String>, out: &mut dyn Write) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => current_name(store)?,
    };
    let list = require_list(store, &name)?;

    writeln!(out, "{}\n", list.name())?;
    if list.is_empty() {
        writeln!(out, "(no tasks)")?;
        return Ok(());
    }
    let (pending, done) = list.split_by_completion();
    for task in pending {
        writeln!(out, "- [ ] {}", task.description)?;
    }
    for task in done {
        writeln!(out, "- [x] {}", task.description)?;
    }
    Ok(())
}

/// Load a list and the effective key bindings into a fresh editor.
pub fn open_editor(store: &Store, config: &ResolvedConfig, name: Option<String>) -> Result<Editor> {
    let name = match name {
        Some(name) => name,
        None => current_name(store)?,
    };
    let list = require_list(store, &name)?;
    let keymap = load_keymap(config.keymap_file.as_deref())?;
    Ok(Editor::new(list, keymap))
}

fn open(store: &mut Store, config: &ResolvedConfig, name: Option<String>) -> Result<()> {
    let editor = open_editor(store, config, name)?;
    let name = editor.list().name().to_string();
    store.set_current_list_name(&name)?;

    let editor = tui::run(editor, store)?;
    if editor.is_dirty() {
        info!("Left {:?} with unsaved changes", name);
    }
    Ok(())
}

fn import(store: &mut Store, file: &Path, out: &mut dyn Write) -> Result<()> {
    let format = FileFormat::from_path(file)?;
    let text = fs::read_to_string(file)?;
    let lists = transfer::parse_lists(&text, format)?;
    store.merge_generated(&lists)?;

    writeln!(out, "Imported from \"{}\":", file.display())?;
    for list in &lists {
        let n = list.len();
        writeln!(out, "  - {} ({n} {})", list.name(), plural(n, "task"))?;
    }
    Ok(())
}

fn export(store: &Store, file: &Path, names: Vec<String>, out: &mut dyn Write) -> Result<()> {
    let format = FileFormat::from_path(file)?;
    let names = if names.is_empty() {
        vec![current_name(store)?]
    } else {
        names
    };
    let lists = names
        .iter()
        .map(|name| require_list(store, name))
        .collect::<Result<Vec<_>>>()?;
    fs::write(file, transfer::export_lists(&lists, format)?)?;

    writeln!(out, "Exported to \"{}\":", file.display())?;
    for name in &names {
        writeln!(out, "  - {name}")?;
    }
    Ok(())
}

fn kmap(
    store: &mut Store,
    config: &ResolvedConfig,
    command: KmapCommand,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        KmapCommand::Show => show_keymap(store, config, out)?,
        KmapCommand::Set { file } => {
            let path = fs::canonicalize(&file)?;
            let text = path.to_str().ok_or_else(|| {
                Error::Validation(format!("path {} is not valid UTF-8", path.display()))
            })?;
            // Reject a file that parses but leaves the bindings unusable.
            load_keymap(Some(&path))?;
            store.set_keymap_path(text)?;
            writeln!(out, "Using {} for key bindings.", path.display())?;
        }
        KmapCommand::Clear => {
            store.set_keymap_path("")?;
            writeln!(out, "Reverted to the default key bindings.")?;
        }
    }
    Ok(())
}

/// The effective key binding source followed by every binding per mode.
fn show_keymap(store: &Store, config: &ResolvedConfig, out: &mut dyn Write) -> Result<()> {
    match &config.keymap_file {
        None => writeln!(out, "No file set. Using defaults.")?,
        Some(path) => {
            writeln!(out, "Using {} for key bindings.", path.display())?;
            if !path.exists() {
                writeln!(out, "WARNING: file does not exist. Using defaults.")?;
            }
        }
    }
    if let Some(stored) = store.keymap_path()? {
        if config.keymap_file.as_ref() != Some(&stored) {
            writeln!(out, "Stored file {} is overridden.", stored.display())?;
        }
    }

    let keymap = load_keymap(config.keymap_file.as_deref())?;
    write_bindings(&keymap.normal, out)?;
    write_bindings(&keymap.insert, out)?;
    write_bindings(&keymap.visual, out)?;
    Ok(())
}

fn write_bindings<A: KeyCommand>(
    bindings: &ModeBindings<A>,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "\n[{}]", A::MODE.name())?;
    for (action, key) in bindings.bindings() {
        writeln!(out, "  {:<8} {}", display_key(key), action.help())?;
    }
    Ok(())
}

fn current_name(store: &Store) -> Result<String> {
    let name = store.current_list_name()?;
    if name.is_empty() {
        return Err(Error::NotFound(
            "no current list; create one with `listly new <name>`".to_string(),
        ));
    }
    Ok(name)
}

fn require_list(store: &Store, name: &str) -> Result<TaskList> {
    if !store.list_exists(name)? {
        return Err(Error::NotFound(format!("list \"{name}\"")));
    }
    store.get_list(name)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 { word.to_string() } else { format!("{word}s") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    fn config() -> ResolvedConfig {
        ResolvedConfig {
            data_dir: PathBuf::from("."),
            keymap_file: None,
            log_level: LevelFilter::Info,
        }
    }

    fn exec(store: &mut Store, args: &[&str]) -> Result<String> {
        exec_with(store, &config(), args)
    }

    fn exec_with(store: &mut Store, config: &ResolvedConfig, args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("listly").chain(args.iter().copied()))
            .expect("arguments should parse");
        let mut out = Vec::new();
        run(cli.command, store, config, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["listly", "list", "--data-dir", "/tmp/x"]).unwrap();
        assert_eq!(cli.overrides().data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Some(Command::List)));

        let cli = Cli::try_parse_from(["listly"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_delete_needs_names_or_all() {
        assert!(Cli::try_parse_from(["listly", "delete"]).is_err());
        assert!(Cli::try_parse_from(["listly", "delete", "--all", "Work"]).is_err());
        assert!(Cli::try_parse_from(["listly", "delete", "--all"]).is_ok());
    }

    #[test]
    fn test_new_sets_last_as_current() {
        let mut store = Store::open_in_memory().unwrap();
        let out = exec(&mut store, &["new", "Work", "Home"]).unwrap();
        assert!(out.contains("  - Work"));
        assert_eq!(store.current_list_name().unwrap(), "Home");

        let out = exec(&mut store, &["list"]).unwrap();
        assert!(out.contains("* Home"));
        assert!(out.contains("  Work"));
    }

    #[test]
    fn test_new_rejects_existing_name_without_writing() {
        let mut store = Store::open_in_memory().unwrap();
        exec(&mut store, &["new", "Work"]).unwrap();
        let err = exec(&mut store, &["new", "Home", "Work"]).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
        assert!(!store.list_exists("Home").unwrap());
        assert_eq!(store.current_list_name().unwrap(), "Work");
    }

    #[test]
    fn test_show_prints_pending_before_done() {
        let mut store = Store::open_in_memory().unwrap();
        let mut list = TaskList::new("Groceries");
        list.add_new_task("Milk", true).unwrap();
        list.add_new_task("Eggs", false).unwrap();
        store.save_list(&list).unwrap();
        store.set_current_list_name("Groceries").unwrap();

        let out = exec(&mut store, &["show"]).unwrap();
        assert_eq!(out, "Groceries\n\n- [ ] Eggs\n- [x] Milk\n");
    }

    #[test]
    fn test_show_without_current_list_fails() {
        let mut store = Store::open_in_memory().unwrap();
        assert!(matches!(exec(&mut store, &["show"]), Err(Error::NotFound(_))));
        assert!(matches!(exec(&mut store, &["show", "Nope"]), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_switch_rename_delete() {
        let mut store = Store::open_in_memory().unwrap();
        exec(&mut store, &["new", "A", "B"]).unwrap();
        exec(&mut store, &["switch", "A"]).unwrap();
        assert_eq!(store.current_list_name().unwrap(), "A");
        assert!(exec(&mut store, &["switch", "C"]).is_err());

        exec(&mut store, &["rename", "A", "C"]).unwrap();
        assert_eq!(store.current_list_name().unwrap(), "C");

        let out = exec(&mut store, &["delete", "C"]).unwrap();
        assert_eq!(out, "Deleted 1 list.\n");
        assert_eq!(store.current_list_name().unwrap(), "");

        exec(&mut store, &["delete", "--all"]).unwrap();
        assert!(store.list_names().unwrap().is_empty());
    }

    #[test]
    fn test_clean_defaults_to_current_list() {
        let mut store = Store::open_in_memory().unwrap();
        for name in ["A", "B"] {
            let mut list = TaskList::new(name);
            list.add_new_task("done", true).unwrap();
            list.add_new_task("open", false).unwrap();
            store.save_list(&list).unwrap();
        }
        store.set_current_list_name("A").unwrap();

        let out = exec(&mut store, &["clean"]).unwrap();
        assert_eq!(out, "Removed 1 completed task.\n");
        assert_eq!(store.get_list("A").unwrap().len(), 1);
        assert_eq!(store.get_list("B").unwrap().len(), 2);

        exec(&mut store, &["clean", "--all"]).unwrap();
        assert_eq!(store.get_list("B").unwrap().num_done(), 0);
    }

    #[test]
    fn test_export_then_import_under_new_name() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lists.json");
        let file_arg = file.to_str().unwrap();

        let mut store = Store::open_in_memory().unwrap();
        let mut list = TaskList::new("Work");
        list.add_new_task("Report", false).unwrap();
        store.save_list(&list).unwrap();
        store.set_current_list_name("Work").unwrap();

        exec(&mut store, &["export", file_arg]).unwrap();
        assert!(matches!(
            exec(&mut store, &["import", file_arg]),
            Err(Error::AlreadyExists(_))
        ));

        exec(&mut store, &["rename", "Work", "Old"]).unwrap();
        let out = exec(&mut store, &["import", file_arg]).unwrap();
        assert!(out.contains("Work (1 task)"));
        assert_eq!(store.get_list("Work").unwrap().len(), 1);
    }

    #[test]
    fn test_yaml_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lists.yaml");
        let file_arg = file.to_str().unwrap();

        let mut store = Store::open_in_memory().unwrap();
        let mut list = TaskList::new("Work");
        list.add_new_task("Report", true).unwrap();
        list.add_new_task("Email", false).unwrap();
        store.save_list(&list).unwrap();

        exec(&mut store, &["export", file_arg, "Work"]).unwrap();
        assert!(fs::read_to_string(&file).unwrap().contains("title: Work"));

        exec(&mut store, &["delete", "Work"]).unwrap();
        exec(&mut store, &["import", file_arg]).unwrap();
        let imported = store.get_list("Work").unwrap();
        let tasks: Vec<(String, bool)> = imported
            .tasks_in_order()
            .map(|t| (t.description.clone(), t.done))
            .collect();
        assert_eq!(tasks, vec![("Report".to_string(), true), ("Email".to_string(), false)]);
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lists.txt");
        let file_arg = file.to_str().unwrap();

        let mut store = Store::open_in_memory().unwrap();
        exec(&mut store, &["new", "Work"]).unwrap();

        let err = exec(&mut store, &["export", file_arg]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(!file.exists());

        fs::write(&file, r#"{"title": "Home"}"#).unwrap();
        let err = exec(&mut store, &["import", file_arg]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(!store.list_exists("Home").unwrap());
    }

    #[test]
    fn test_kmap_set_show_clear() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("keys.toml");
        fs::write(&file, "[Normal]\nNewTask = \"a\"\n").unwrap();

        let mut store = Store::open_in_memory().unwrap();
        let out = exec(&mut store, &["kmap", "show"]).unwrap();
        assert!(out.starts_with("No file set. Using defaults.\n"));
        assert!(out.contains("[Normal]\n"));
        assert!(out.contains("  n        new task\n"));
        assert!(out.contains("  space    "));

        exec(&mut store, &["kmap", "set", file.to_str().unwrap()]).unwrap();
        let stored = store.keymap_path().unwrap().unwrap();
        assert_eq!(stored, fs::canonicalize(&file).unwrap());

        // main resolves the stored path into the config before dispatch
        let resolved = ResolvedConfig {
            keymap_file: Some(stored.clone()),
            ..config()
        };
        let out = exec_with(&mut store, &resolved, &["kmap", "show"]).unwrap();
        assert!(out.starts_with(&format!("Using {} for key bindings.\n", stored.display())));
        assert!(!out.contains("overridden"));
        assert!(out.contains("  a        new task\n"));
        assert!(!out.contains("  n        new task\n"));

        let out = exec(&mut store, &["kmap", "show"]).unwrap();
        assert!(out.contains(&format!("Stored file {} is overridden.", stored.display())));

        exec(&mut store, &["kmap", "clear"]).unwrap();
        assert!(store.keymap_path().unwrap().is_none());
    }

    #[test]
    fn test_kmap_set_missing_file_fails() {
        let mut store = Store::open_in_memory().unwrap();
        let err = exec(&mut store, &["kmap", "set", "/definitely/not/here.toml"]).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(store.keymap_path().unwrap().is_none());
    }

    #[test]
    fn test_open_editor_uses_current_list() {
        let mut store = Store::open_in_memory().unwrap();
        exec(&mut store, &["new", "Work"]).unwrap();
        let editor = open_editor(&store, &config(), None).unwrap();
        assert_eq!(editor.list().name(), "Work");
        assert!(!editor.is_dirty());
    }
}
