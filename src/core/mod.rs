//! # Core Application Logic
//!
//! This module contains listly's domain logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │          CORE           │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • TaskList (model)     │
//!                    │  • KeyMap (bindings)    │
//!                    │  • Editor (modal FSM)   │
//!                    │  • Store (SQLite KV)    │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │    CLI     │      │  Import /  │
//!     │  Adapter   │      │  commands  │      │  Export    │
//!     │ (ratatui)  │      │   (clap)   │      │(JSON, YAML)│
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`task_list`]: `TaskList`, the ordered tasks of one list and the display mapping
//! - [`keymap`]: key → action tables per editor mode
//! - [`editor`]: the Normal / Insert / Visual state machine
//! - [`store`]: transactional persistence
//! - [`config`]: settings file and override hierarchy
//! - [`transfer`]: JSON and YAML import/export documents
//! - [`error`]: the crate-wide `Error`

pub mod config;
pub mod editor;
pub mod error;
pub mod keymap;
pub mod store;
pub mod task_list;
pub mod transfer;

pub use error::{Error, Result};
