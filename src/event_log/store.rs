// src/event_log/store.rs

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::model::{
    FormEvent, LOAD_TAIL_LINES, LOG_BACKUP_NAME, LOG_FILE_NAME, MAX_LOG_BYTES, MAX_LOG_EVENTS,
};

/// Append-only JSONL event log with a small in-memory tail. Writes are
/// best-effort: a full disk must never block the registration flow itself.
pub struct EventLog {
    path: PathBuf,
    buf: VecDeque<FormEvent>,
    next_id: u64,
}

impl EventLog {
    pub fn init(data_dir: &Path) -> Result<Self, String> {
        fs::create_dir_all(data_dir).map_err(|e| format!("event log dir create: {e}"))?;

        let mut log = Self {
            path: data_dir.join(LOG_FILE_NAME),
            buf: VecDeque::with_capacity(MAX_LOG_EVENTS),
            next_id: 1,
        };

        log.load_tail_best_effort();
        log.next_id = log.compute_next_id();

        Ok(log)
    }

    pub fn record(&mut self, kind: &str, context: &str, msg: &str) {
        let ev = FormEvent {
            id: self.alloc_id(),
            ts_ms: now_ms(),
            kind: kind.to_string(),
            context: context.to_string(),
            msg: msg.to_string(),
        };

        if self.buf.len() >= MAX_LOG_EVENTS {
            self.buf.pop_front();
        }
        self.buf.push_back(ev.clone());

        let _ = self.rotate_if_needed_best_effort();
        let _ = self.append_jsonl_best_effort(&ev);
    }

    pub fn recent(&self) -> Vec<FormEvent> {
        self.buf.iter().cloned().collect()
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn compute_next_id(&self) -> u64 {
        self.buf
            .iter()
            .map(|e| e.id)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    }

    fn rotate_if_needed_best_effort(&self) -> Result<(), String> {
        let meta = match fs::metadata(&self.path) {
            Ok(m) => m,
            Err(_) => return Ok(()),
        };

        if meta.len() <= MAX_LOG_BYTES {
            return Ok(());
        }

        let backup = self.path.with_file_name(LOG_BACKUP_NAME);
        let _ = fs::remove_file(&backup);
        fs::rename(&self.path, &backup).map_err(|e| format!("event log rotate: {e}"))?;

        Ok(())
    }

    fn append_jsonl_best_effort(&self, ev: &FormEvent) -> Result<(), String> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| format!("event log open: {e}"))?;

        let line = serde_json::to_string(ev).map_err(|e| format!("event log json: {e}"))?;
        f.write_all(line.as_bytes())
            .and_then(|_| f.write_all(b"\n"))
            .map_err(|e| format!("event log write: {e}"))?;

        let _ = f.flush();
        Ok(())
    }

    fn load_tail_best_effort(&mut self) {
        let Ok(file) = File::open(&self.path) else {
            return;
        };
        let reader = BufReader::new(file);

        let mut tail: VecDeque<String> = VecDeque::with_capacity(LOAD_TAIL_LINES);
        for line in reader.lines().map_while(Result::ok) {
            if tail.len() >= LOAD_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line);
        }

        for line in tail {
            if let Ok(ev) = serde_json::from_str::<FormEvent>(&line) {
                if self.buf.len() >= MAX_LOG_EVENTS {
                    self.buf.pop_front();
                }
                self.buf.push_back(ev);
            }
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ======================================================
// Unit Tests
// ======================================================
