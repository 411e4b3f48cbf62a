// src/event_log/model.rs

use serde::{Deserialize, Serialize};

pub const LOG_FILE_NAME: &str = "registration.log.jsonl";
pub const LOG_BACKUP_NAME: &str = "registration.log.jsonl.1";

pub const MAX_LOG_BYTES: u64 = 1024 * 1024;
pub const MAX_LOG_EVENTS: usize = 50;
pub const LOAD_TAIL_LINES: usize = 200;

/// One line in the registration event log: draft lifecycle, bot detection,
/// submission outcomes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormEvent {
    pub id: u64,
    pub ts_ms: u64,
    pub kind: String,
    pub context: String,
    pub msg: String,
}
