//! Import/export documents, as JSON or YAML.
//!
//! ```json
//! [{"title": "Groceries", "tasks": [{"description": "Milk", "done": false}]}]
//! ```
//!
//! The format follows the file extension: `.json`, or `.yaml`/`.yml`.
//! Import accepts one document or an array of them. Ids are never written;
//! imported tasks get fresh ones.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::task_list::TaskList;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListDocument {
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<TaskDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskDocument {
    pub description: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Documents {
    One(ListDocument),
    Many(Vec<ListDocument>),
}

impl From<&TaskList> for ListDocument {
    fn from(list: &TaskList) -> Self {
        Self {
            title: list.name().to_string(),
            tasks: list
                .tasks_in_order()
                .map(|t| TaskDocument {
                    description: t.description.clone(),
                    done: t.done,
                })
                .collect(),
        }
    }
}

impl ListDocument {
    pub fn into_list(self) -> Result<TaskList> {
        if self.title.is_empty() {
            return Err(Error::Validation("imported list has an empty title".to_string()));
        }
        let mut list = TaskList::new(self.title);
        for task in self.tasks {
            list.add_new_task(task.description, task.done)?;
        }
        Ok(list)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        match ext.to_ascii_lowercase().as_str() {
            "json" => Ok(FileFormat::Json),
            "yaml" | "yml" => Ok(FileFormat::Yaml),
            _ => Err(Error::Validation(format!(
                "unsupported file format {:?} for {}; use .json or .yaml",
                ext,
                path.display()
            ))),
        }
    }
}

/// The lists as one array, tasks in manual order.
pub fn export_lists(lists: &[TaskList], format: FileFormat) -> Result<String> {
    let docs: Vec<ListDocument> = lists.iter().map(ListDocument::from).collect();
    let text = match format {
        FileFormat::Json => serde_json::to_string_pretty(&docs)?,
        FileFormat::Yaml => serde_yaml::to_string(&docs)?,
    };
    Ok(text)
}

/// Build fresh lists from one document or an array of documents.
pub fn parse_lists(text: &str, format: FileFormat) -> Result<Vec<TaskList>> {
    let docs = match format {
        FileFormat::Json => serde_json::from_str::<Documents>(text)?,
        FileFormat::Yaml => serde_yaml::from_str::<Documents>(text)?,
    };
    let docs = match docs {
        Documents::One(doc) => vec![doc],
        Documents::Many(docs) => docs,
    };
    docs.into_iter().map(ListDocument::into_list).collect()
}
