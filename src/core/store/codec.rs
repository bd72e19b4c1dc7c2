//! Byte layout of the records stored under each list.
//!
//! ```text
//! info/name                       UTF-8
//! info/numDone                    u64 BE
//! info/numPending                 u64 BE
//! info/numTasks                   u64 BE
//! data/taskIds                    u64 BE × n, manual order
//! data/tasks/<id u64 BE>/id       u64 BE
//! data/tasks/<id u64 BE>/description
//! data/tasks/<id u64 BE>/done     one byte, 0 or 1
//! ```

use crate::core::error::{Error, Result};
use crate::core::task_list::TaskId;

pub const INFO_NAME: &[u8] = b"info/name";
pub const INFO_NUM_DONE: &[u8] = b"info/numDone";
pub const INFO_NUM_PENDING: &[u8] = b"info/numPending";
pub const INFO_NUM_TASKS: &[u8] = b"info/numTasks";
pub const TASK_IDS: &[u8] = b"data/taskIds";

const TASKS_PREFIX: &[u8] = b"data/tasks/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Id,
    Description,
    Done,
}

impl TaskField {
    fn suffix(self) -> &'static [u8] {
        match self {
            TaskField::Id => b"/id",
            TaskField::Description => b"/description",
            TaskField::Done => b"/done",
        }
    }
}

pub fn task_key(id: TaskId, field: TaskField) -> Vec<u8> {
    let mut key = Vec::with_capacity(TASKS_PREFIX.len() + 8 + 12);
    key.extend_from_slice(TASKS_PREFIX);
    key.extend_from_slice(&id.to_be_bytes());
    key.extend_from_slice(field.suffix());
    key
}

pub fn encode_u64(n: u64) -> Vec<u8> {
    n.to_be_bytes().to_vec()
}

pub fn decode_u64(bytes: &[u8]) -> Result<u64> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| {
            Error::Validation(format!("expected 8-byte integer, got {} bytes", bytes.len()))
        })?;
    Ok(u64::from_be_bytes(arr))
}

pub fn encode_ids(ids: &[TaskId]) -> Vec<u8> {
    ids.iter().flat_map(|id| id.to_be_bytes()).collect()
}

pub fn decode_ids(bytes: &[u8]) -> Result<Vec<TaskId>> {
    if bytes.len() % 8 != 0 {
        return Err(Error::Validation(format!(
            "task id sequence of {} bytes is not a multiple of 8",
            bytes.len()
        )));
    }
    bytes.chunks_exact(8).map(decode_u64).collect()
}

pub fn encode_bool(b: bool) -> Vec<u8> {
    vec![u8::from(b)]
}

pub fn decode_bool(bytes: &[u8]) -> Result<bool> {
    match bytes {
        [0] => Ok(false),
        [1] => Ok(true),
        _ => Err(Error::Validation(format!("invalid boolean record {bytes:?}"))),
    }
}

pub fn decode_text(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| Error::Validation(format!("stored text is not UTF-8: {e}")))
}
