//! # Key Bindings
//!
//! Maps key strings (`"k"`, `"ctrl+c"`, `"esc"`, `" "`) to one tagged action
//! per editor mode. Bindings resolve per mode as:
//!
//! ```text
//! built-in defaults (shared + mode)  →  user [Shared]  →  user [<Mode>]
//! ```
//!
//! The override file is TOML with one table per mode:
//!
//! ```toml
//! [Shared]
//! Up = "k"
//! Down = "j"
//!
//! [Normal]
//! Write = "s"
//! ```
//!
//! A missing or unreadable override file falls back to the defaults. A file
//! that parses but binds one key to two commands of the same mode is an error:
//! the session must not start with a half-applied table.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::fs;
use std::hash::Hash;
use std::path::Path;

use log::{debug, info, warn};

use crate::core::error::{Error, Result};

/// mode name → command name → key string
pub type BindingTable = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Shared,
    Normal,
    Insert,
    Visual,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Shared, Mode::Normal, Mode::Insert, Mode::Visual];

    /// Table name in the override file.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Shared => "Shared",
            Mode::Normal => "Normal",
            Mode::Insert => "Insert",
            Mode::Visual => "Visual",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// An action of one editor mode, addressable by its command name.
pub trait Command: Copy + Eq + Hash + Debug + 'static {
    const MODE: Mode;

    fn all() -> &'static [Self];

    fn name(self) -> &'static str;

    fn help(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.name() == name)
    }
}

// ============================================================================
// Actions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalAction {
    Up,
    UpFive,
    Down,
    DownFive,
    QuitWithWarning,
    QuitNoWarning,
    NewTask,
    NewBefore,
    NewAfter,
    EditTask,
    ClearAndEdit,
    DeleteTask,
    ToggleCompletion,
    EnableVisualMode,
    Yank,
    PasteAfter,
    PasteBefore,
    Write,
    JumpUp,
    JumpDown,
}

impl Command for NormalAction {
    const MODE: Mode = Mode::Normal;

    fn all() -> &'static [Self] {
        use NormalAction::*;
        &[
            Up, UpFive, Down, DownFive, QuitWithWarning, QuitNoWarning, NewTask, NewBefore,
            NewAfter, EditTask, ClearAndEdit, DeleteTask, ToggleCompletion, EnableVisualMode,
            Yank, PasteAfter, PasteBefore, Write, JumpUp, JumpDown,
        ]
    }

    fn name(self) -> &'static str {
        match self {
            NormalAction::Up => "Up",
            NormalAction::UpFive => "UpFive",
            NormalAction::Down => "Down",
            NormalAction::DownFive => "DownFive",
            NormalAction::QuitWithWarning => "QuitWithWarning",
            NormalAction::QuitNoWarning => "QuitNoWarning",
            NormalAction::NewTask => "NewTask",
            NormalAction::NewBefore => "NewBefore",
            NormalAction::NewAfter => "NewAfter",
            NormalAction::EditTask => "EditTask",
            NormalAction::ClearAndEdit => "ClearAndEdit",
            NormalAction::DeleteTask => "DeleteTask",
            NormalAction::ToggleCompletion => "ToggleCompletion",
            NormalAction::EnableVisualMode => "EnableVisualMode",
            NormalAction::Yank => "Yank",
            NormalAction::PasteAfter => "PasteAfter",
            NormalAction::PasteBefore => "PasteBefore",
            NormalAction::Write => "Write",
            NormalAction::JumpUp => "JumpUp",
            NormalAction::JumpDown => "JumpDown",
        }
    }

    fn help(self) -> &'static str {
        match self {
            NormalAction::Up => "up",
            NormalAction::UpFive => "up 5",
            NormalAction::Down => "down",
            NormalAction::DownFive => "down 5",
            NormalAction::QuitWithWarning => "quit",
            NormalAction::QuitNoWarning => "force quit",
            NormalAction::NewTask => "new task",
            NormalAction::NewBefore => "new task before",
            NormalAction::NewAfter => "new task after",
            NormalAction::EditTask => "edit task",
            NormalAction::ClearAndEdit => "clear and edit",
            NormalAction::DeleteTask => "cut task",
            NormalAction::ToggleCompletion => "mark done/not done",
            NormalAction::EnableVisualMode => "visual mode",
            NormalAction::Yank => "yank",
            NormalAction::PasteAfter => "paste",
            NormalAction::PasteBefore => "paste before",
            NormalAction::Write => "write",
            NormalAction::JumpUp => "jump up",
            NormalAction::JumpDown => "jump down",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertAction {
    Discard,
    QuitNoWarning,
    Save,
}

impl Command for InsertAction {
    const MODE: Mode = Mode::Insert;

    fn all() -> &'static [Self] {
        &[InsertAction::Discard, InsertAction::QuitNoWarning, InsertAction::Save]
    }

    fn name(self) -> &'static str {
        match self {
            InsertAction::Discard => "Discard",
            InsertAction::QuitNoWarning => "QuitNoWarning",
            InsertAction::Save => "Save",
        }
    }

    fn help(self) -> &'static str {
        match self {
            InsertAction::Discard => "discard changes",
            InsertAction::QuitNoWarning => "force quit",
            InsertAction::Save => "save",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualAction {
    Up,
    UpFive,
    Down,
    DownFive,
    NormalMode,
    QuitNoWarning,
    Delete,
    Yank,
    ToggleCompletion,
    JumpUp,
    JumpDown,
}

impl Command for VisualAction {
    const MODE: Mode = Mode::Visual;

    fn all() -> &'static [Self] {
        use VisualAction::*;
        &[
            Up, UpFive, Down, DownFive, NormalMode, QuitNoWarning, Delete, Yank,
            ToggleCompletion, JumpUp, JumpDown,
        ]
    }

    fn name(self) -> &'static str {
        match self {
            VisualAction::Up => "Up",
            VisualAction::UpFive => "UpFive",
            VisualAction::Down => "Down",
            VisualAction::DownFive => "DownFive",
            VisualAction::NormalMode => "NormalMode",
            VisualAction::QuitNoWarning => "QuitNoWarning",
            VisualAction::Delete => "Delete",
            VisualAction::Yank => "Yank",
            VisualAction::ToggleCompletion => "ToggleCompletion",
            VisualAction::JumpUp => "JumpUp",
            VisualAction::JumpDown => "JumpDown",
        }
    }

    fn help(self) -> &'static str {
        match self {
            VisualAction::Up => "up",
            VisualAction::UpFive => "up 5",
            VisualAction::Down => "down",
            VisualAction::DownFive => "down 5",
            VisualAction::NormalMode => "normal mode",
            VisualAction::QuitNoWarning => "force quit",
            VisualAction::Delete => "cut",
            VisualAction::Yank => "yank",
            VisualAction::ToggleCompletion => "mark done/not done",
            VisualAction::JumpUp => "jump up",
            VisualAction::JumpDown => "jump down",
        }
    }
}

// ============================================================================
// Defaults
// ============================================================================

const DEFAULT_SHARED: &[(&str, &str)] = &[
    ("Up", "k"),
    ("UpFive", "K"),
    ("Down", "j"),
    ("DownFive", "J"),
    ("QuitNoWarning", "ctrl+c"),
    ("Yank", "y"),
    ("ToggleCompletion", " "),
    ("JumpUp", "{"),
    ("JumpDown", "}"),
];

const DEFAULT_NORMAL: &[(&str, &str)] = &[
    ("QuitWithWarning", "q"),
    ("NewTask", "n"),
    ("NewBefore", "O"),
    ("NewAfter", "o"),
    ("EditTask", "i"),
    ("ClearAndEdit", "x"),
    ("DeleteTask", "d"),
    ("EnableVisualMode", "v"),
    ("PasteAfter", "p"),
    ("PasteBefore", "P"),
    ("Write", "w"),
];

const DEFAULT_INSERT: &[(&str, &str)] = &[("Discard", "esc"), ("Save", "enter")];

const DEFAULT_VISUAL: &[(&str, &str)] = &[("NormalMode", "esc"), ("Delete", "d")];

/// A fresh copy of the built-in binding table.
pub fn default_bindings() -> BindingTable {
    let table = |pairs: &[(&str, &str)]| {
        pairs
            .iter()
            .map(|(cmd, key)| (cmd.to_string(), key.to_string()))
            .collect::<BTreeMap<_, _>>()
    };
    BTreeMap::from([
        (Mode::Shared.name().to_string(), table(DEFAULT_SHARED)),
        (Mode::Normal.name().to_string(), table(DEFAULT_NORMAL)),
        (Mode::Insert.name().to_string(), table(DEFAULT_INSERT)),
        (Mode::Visual.name().to_string(), table(DEFAULT_VISUAL)),
    ])
}

// ============================================================================
// Resolved bindings
// ============================================================================

/// Effective key → action table for one mode.
#[derive(Debug, Clone)]
pub struct ModeBindings<A> {
    by_key: HashMap<String, A>,
    keys: Vec<(A, String)>,
}

impl<A: Command> ModeBindings<A> {
    fn resolve(defaults: &BindingTable, overrides: &BindingTable) -> Result<Self> {
        let lookup = |table: &BindingTable, mode: Mode, cmd: &str| {
            table
                .get(mode.name())
                .and_then(|t| t.get(cmd))
                .map(|k| normalize_key(k))
        };
        let mode = A::MODE.name();

        let mut keys = Vec::with_capacity(A::all().len());
        for &action in A::all() {
            let cmd = action.name();
            let key = lookup(overrides, A::MODE, cmd)
                .or_else(|| lookup(overrides, Mode::Shared, cmd))
                .or_else(|| lookup(defaults, A::MODE, cmd))
                .or_else(|| lookup(defaults, Mode::Shared, cmd))
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    Error::Validation(format!(
                        "missing key binding for command {cmd} in {mode} mode"
                    ))
                })?;
            keys.push((action, key));
        }

        let mut by_key: HashMap<String, A> = HashMap::with_capacity(keys.len());
        for (action, key) in &keys {
            if let Some(existing) = by_key.get(key) {
                return Err(Error::Validation(format!(
                    "conflicting key binding in {mode} mode: {} and {} both bound to {key:?}",
                    existing.name(),
                    action.name(),
                )));
            }
            by_key.insert(key.clone(), *action);
        }

        Ok(Self { by_key, keys })
    }

    pub fn action(&self, key: &str) -> Option<A> {
        self.by_key.get(key).copied()
    }

    pub fn key(&self, action: A) -> &str {
        self.keys
            .iter()
            .find(|(a, _)| *a == action)
            .map_or("", |(_, k)| k.as_str())
    }

    /// Every binding, in command declaration order.
    pub fn bindings(&self) -> impl Iterator<Item = (A, &str)> {
        self.keys.iter().map(|(a, k)| (*a, k.as_str()))
    }
}

/// Resolved bindings for every editor mode.
#[derive(Debug, Clone)]
pub struct KeyMap {
    pub normal: ModeBindings<NormalAction>,
    pub insert: ModeBindings<InsertAction>,
    pub visual: ModeBindings<VisualAction>,
}

impl KeyMap {
    pub fn resolve(defaults: &BindingTable, overrides: &BindingTable) -> Result<Self> {
        warn_unknown(overrides);
        Ok(Self {
            normal: ModeBindings::resolve(defaults, overrides)?,
            insert: ModeBindings::resolve(defaults, overrides)?,
            visual: ModeBindings::resolve(defaults, overrides)?,
        })
    }

    pub fn defaults() -> Result<Self> {
        Self::resolve(&default_bindings(), &BindingTable::new())
    }
}

fn warn_unknown(overrides: &BindingTable) {
    for (mode_name, commands) in overrides {
        let Some(mode) = Mode::from_name(mode_name) else {
            warn!("Ignoring unknown key binding mode {:?}", mode_name);
            continue;
        };
        for cmd in commands.keys() {
            let known = match mode {
                Mode::Shared => {
                    NormalAction::from_name(cmd).is_some()
                        || InsertAction::from_name(cmd).is_some()
                        || VisualAction::from_name(cmd).is_some()
                }
                Mode::Normal => NormalAction::from_name(cmd).is_some(),
                Mode::Insert => InsertAction::from_name(cmd).is_some(),
                Mode::Visual => VisualAction::from_name(cmd).is_some(),
            };
            if !known {
                warn!("Ignoring unknown command {:?} in [{}] key bindings", cmd, mode_name);
            }
        }
    }
}

/// `"space"` is accepted as a spelling of `" "`.
pub fn normalize_key(key: &str) -> String {
    if key == "space" {
        " ".to_string()
    } else {
        key.to_string()
    }
}

/// Printable form of a key string for help text.
pub fn display_key(key: &str) -> &str {
    if key == " " { "space" } else { key }
}

// ============================================================================
// Loading
// ============================================================================

pub fn parse_bindings(text: &str) -> std::result::Result<BindingTable, toml::de::Error> {
    toml::from_str(text)
}

/// Load bindings from an optional override file.
///
/// An absent, unreadable or unparsable file yields the defaults. Validation
/// errors (missing or conflicting bindings) are returned.
pub fn load_keymap(path: Option<&Path>) -> Result<KeyMap> {
    let defaults = default_bindings();
    let Some(path) = path else {
        debug!("No key binding file configured, using defaults");
        return KeyMap::resolve(&defaults, &BindingTable::new());
    };

    let overrides = match fs::read_to_string(path) {
        Ok(text) => match parse_bindings(&text) {
            Ok(table) => {
                info!("Loaded key bindings from {}", path.display());
                table
            }
            Err(e) => {
                warn!("Could not parse key bindings {}: {}. Using defaults", path.display(), e);
                BindingTable::new()
            }
        },
        Err(e) => {
            warn!("Could not read key bindings {}: {}. Using defaults", path.display(), e);
            BindingTable::new()
        }
    };

    KeyMap::resolve(&defaults, &overrides)
}
