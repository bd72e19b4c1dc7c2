//! # TUI Components
//!
//! Each component receives its data as props and renders into a `Rect`:
//!
//! ```text
//! components/
//! ├── mod.rs        (this file)
//! ├── task_view.rs  (list body, inline text field, visual highlight)
//! ├── help_bar.rs   (effective bindings of the current mode)
//! └── confirm.rs    (unsaved-changes dialog)
//! ```
//!
//! Components never mutate the editor. Key handling lives in
//! `core::editor`; these only read it.

pub mod confirm;
pub mod help_bar;
pub mod task_view;

pub use confirm::ConfirmDialog;
pub use help_bar::HelpBar;
pub use task_view::TaskView;
