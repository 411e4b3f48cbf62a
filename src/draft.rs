// src/draft.rs

use crate::context::DRAFT_KEY;
use crate::error::{AppError, AppResult};
use crate::types::{FormRecord, Gender, ParentOccupation};

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

pub const DEBOUNCE_WINDOW: Duration = Duration::from_secs(1);

/// Key-value capability for the draft slot. Injected so business logic never
/// touches ambient storage and tests can swap in an in-memory fake.
pub trait DraftStore {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> AppResult<()>;
    fn delete(&mut self, key: &str) -> AppResult<()>;
}

// ------------------------------------------------------
// Persisted shape
// ------------------------------------------------------

/// The binary-free, consent-free subset of a `FormRecord` that survives a
/// session. File slots cannot round-trip through JSON and consent must be
/// re-affirmed, so neither is part of this struct at all.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Draft {
    pub bot_field: String,
    pub full_name: String,
    pub birth_place: String,
    pub birth_date: String,
    pub address: String,
    pub previous_school: String,
    pub nisn: String,
    pub gender: Gender,
    pub father_name: String,
    pub father_occupation: ParentOccupation,
    pub father_occupation_other: String,
    pub mother_name: String,
    pub mother_occupation: ParentOccupation,
    pub mother_occupation_other: String,
    pub parent_wa_number: String,
    pub info_source: BTreeSet<String>,
}

impl Draft {
    pub fn from_record(record: &FormRecord) -> Self {
        Self {
            bot_field: record.bot_field.clone(),
            full_name: record.full_name.clone(),
            birth_place: record.birth_place.clone(),
            birth_date: record.birth_date.clone(),
            address: record.address.clone(),
            previous_school: record.previous_school.clone(),
            nisn: record.nisn.clone(),
            gender: record.gender,
            father_name: record.father_name.clone(),
            father_occupation: record.father_occupation,
            father_occupation_other: record.father_occupation_other.clone(),
            mother_name: record.mother_name.clone(),
            mother_occupation: record.mother_occupation,
            mother_occupation_other: record.mother_occupation_other.clone(),
            parent_wa_number: record.parent_wa_number.clone(),
            info_source: record.info_source.clone(),
        }
    }

    /// Overlay onto a fresh record. Slots stay `None` and consent stays
    /// `false` because this struct never carries them.
    pub fn apply(self, record: &mut FormRecord) {
        record.bot_field = self.bot_field;
        record.full_name = self.full_name;
        record.birth_place = self.birth_place;
        record.birth_date = self.birth_date;
        record.address = self.address;
        record.previous_school = self.previous_school;
        record.nisn = self.nisn;
        record.gender = self.gender;
        record.father_name = self.father_name;
        record.father_occupation = self.father_occupation;
        record.father_occupation_other = self.father_occupation_other;
        record.mother_name = self.mother_name;
        record.mother_occupation = self.mother_occupation;
        record.mother_occupation_other = self.mother_occupation_other;
        record.parent_wa_number = self.parent_wa_number;
        record.info_source = self.info_source;
    }
}

// ------------------------------------------------------
// Stores
// ------------------------------------------------------

/// Draft slot backed by one JSON file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FsDraftStore {
    root: PathBuf,
}

impl FsDraftStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl DraftStore for FsDraftStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::DraftReadFailed(e.to_string())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| AppError::DraftWriteFailed(e.to_string()))?;

        let path = self.path(key);

        // Same-directory temp file + rename keeps the slot atomic.
        let mut rnd = [0u8; 12];
        OsRng.fill_bytes(&mut rnd);
        let tmp = self.root.join(format!(".{key}.{}.tmp", hex::encode(rnd)));

        let mut opts = OpenOptions::new();
        opts.create_new(true).write(true);
        #[cfg(unix)]
        {
            opts.mode(0o600);
        }

        let mut f = opts
            .open(&tmp)
            .map_err(|e| AppError::DraftWriteFailed(e.to_string()))?;

        let write_res: AppResult<()> = (|| {
            f.write_all(value.as_bytes())
                .map_err(|e| AppError::DraftWriteFailed(e.to_string()))?;

            f.flush()
                .map_err(|e| AppError::DraftSyncFailed(e.to_string()))?;
            f.sync_all()
                .map_err(|e| AppError::DraftSyncFailed(e.to_string()))?;

            fs::rename(&tmp, &path).map_err(|e| AppError::DraftRenameFailed(e.to_string()))?;

            Ok(())
        })();

        if write_res.is_err() {
            let _ = fs::remove_file(&tmp);
        }

        write_res
    }

    fn delete(&mut self, key: &str) -> AppResult<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::DraftDeleteFailed(e.to_string())),
        }
    }
}

/// Shared in-memory slot for tests. Clones see the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().map(|m| m.is_empty()).unwrap_or(true)
    }

    pub fn seed(&self, key: &str, value: &str) {
        if let Ok(mut m) = self.entries.lock() {
            m.insert(key.to_string(), value.to_string());
        }
    }
}

impl DraftStore for MemoryDraftStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let m = self
            .entries
            .lock()
            .map_err(|_| AppError::DraftReadFailed("store lock poisoned".to_string()))?;
        Ok(m.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        let mut m = self
            .entries
            .lock()
            .map_err(|_| AppError::DraftWriteFailed("store lock poisoned".to_string()))?;
        m.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> AppResult<()> {
        let mut m = self
            .entries
            .lock()
            .map_err(|_| AppError::DraftDeleteFailed("store lock poisoned".to_string()))?;
        m.remove(key);
        Ok(())
    }
}

// ------------------------------------------------------
// Debounced saver
// ------------------------------------------------------

/// Coalesces rapid record changes into one write roughly every
/// `DEBOUNCE_WINDOW`. Dropped intermediate writes are harmless: only the
/// latest record matters.
pub struct DraftSaver<S: DraftStore> {
    store: S,
    window: Duration,
    deadline: Option<Instant>,
}

impl<S: DraftStore> DraftSaver<S> {
    pub fn new(store: S) -> Self {
        Self::with_window(store, DEBOUNCE_WINDOW)
    }

    pub fn with_window(store: S, window: Duration) -> Self {
        Self {
            store,
            window,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the debounce timer after a record mutation.
    pub fn note_change(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }

    /// Write the draft if the debounce window has elapsed. Returns whether a
    /// write happened.
    pub fn tick(&mut self, record: &FormRecord) -> AppResult<bool> {
        match self.deadline {
            Some(d) if Instant::now() >= d => {
                self.persist(record)?;
                self.deadline = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Write immediately, regardless of the debounce state.
    pub fn flush(&mut self, record: &FormRecord) -> AppResult<()> {
        self.persist(record)?;
        self.deadline = None;
        Ok(())
    }

    pub fn load(&self) -> AppResult<Option<Draft>> {
        let Some(text) = self.store.get(DRAFT_KEY)? else {
            return Ok(None);
        };

        let draft = serde_json::from_str::<Draft>(&text)
            .map_err(|e| AppError::DraftInvalidJson(e.to_string()))?;
        Ok(Some(draft))
    }

    pub fn clear(&mut self) -> AppResult<()> {
        self.deadline = None;
        self.store.delete(DRAFT_KEY)
    }

    fn persist(&mut self, record: &FormRecord) -> AppResult<()> {
        let json = serde_json::to_string(&Draft::from_record(record))
            .map_err(|e| AppError::DraftWriteFailed(e.to_string()))?;
        self.store.set(DRAFT_KEY, &json)
    }
}

// ======================================================
// Unit Tests
// ======================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::test_support::valid_record;

    #[test]
    fn round_trip_preserves_text_fields_and_drops_binaries_and_consent() {
        let original = valid_record();

        let json = serde_json::to_string(&Draft::from_record(&original)).unwrap();
        let restored_draft: Draft = serde_json::from_str(&json).unwrap();

        let mut restored = FormRecord::default();
        restored_draft.apply(&mut restored);

        assert_eq!(restored.full_name, original.full_name);
        assert_eq!(restored.nisn, original.nisn);
        assert_eq!(restored.gender, original.gender);
        assert_eq!(restored.mother_occupation, original.mother_occupation);
        assert_eq!(restored.info_source, original.info_source);

        // Binary slots and consent never round-trip.
        assert!(restored.kartu_keluarga.is_none());
        assert!(restored.akta_kelahiran.is_none());
        assert!(restored.ktp_walimurid.is_none());
        assert!(restored.pas_foto.is_none());
        assert!(!restored.terms_agreed);
    }

    #[test]
    fn drafts_from_older_writers_are_tolerated() {
        // Extra keys (files, consent) are ignored; missing keys take defaults.
        let stored = r#"{
            "fullName": "Budi",
            "termsAgreed": true,
            "kartuKeluarga": {"name": "kk.pdf"},
            "gender": "Perempuan"
        }"#;

        let draft: Draft = serde_json::from_str(stored).unwrap();
        let mut record = FormRecord::default();
        draft.apply(&mut record);

        assert_eq!(record.full_name, "Budi");
        assert_eq!(record.gender, Gender::Perempuan);
        assert!(record.kartu_keluarga.is_none());
        assert!(!record.terms_agreed);
        assert_eq!(record.nisn, "");
    }

    #[test]
    fn load_rejects_unparseable_drafts() {
        let store = MemoryDraftStore::new();
        store.seed(DRAFT_KEY, "{not json");

        let saver = DraftSaver::new(store);
        let err = saver.load().unwrap_err();
        assert!(matches!(err, AppError::DraftInvalidJson(_)));
    }

    #[test]
    fn load_on_empty_store_is_none() {
        let saver = DraftSaver::new(MemoryDraftStore::new());
        assert!(saver.load().unwrap().is_none());
    }

    #[test]
    fn tick_without_a_change_does_not_write() {
        let store = MemoryDraftStore::new();
        let mut saver = DraftSaver::with_window(store.clone(), Duration::ZERO);

        assert!(!saver.tick(&valid_record()).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn tick_writes_once_the_window_elapses() {
        let store = MemoryDraftStore::new();
        let mut saver = DraftSaver::with_window(store.clone(), Duration::from_millis(30));

        saver.note_change();
        assert!(!saver.tick(&valid_record()).unwrap());

        std::thread::sleep(Duration::from_millis(40));
        assert!(saver.tick(&valid_record()).unwrap());
        assert!(!store.is_empty());

        // Debounce disarmed after the write.
        assert!(!saver.tick(&valid_record()).unwrap());
    }

    #[test]
    fn flush_writes_and_clear_deletes() {
        let store = MemoryDraftStore::new();
        let mut saver = DraftSaver::new(store.clone());

        saver.flush(&valid_record()).unwrap();
        assert!(!store.is_empty());
        assert!(saver.load().unwrap().is_some());

        saver.clear().unwrap();
        assert!(store.is_empty());
        assert!(saver.load().unwrap().is_none());
    }

    #[test]
    fn fs_store_round_trips_and_leaves_no_temp_files() {
        let td = tempfile::tempdir().unwrap();
        let mut store = FsDraftStore::new(td.path().to_path_buf());

        assert!(store.get(DRAFT_KEY).unwrap().is_none());

        store.set(DRAFT_KEY, "{\"fullName\":\"Budi\"}").unwrap();
        assert_eq!(
            store.get(DRAFT_KEY).unwrap().unwrap(),
            "{\"fullName\":\"Budi\"}"
        );

        // Overwrite goes through the same atomic path.
        store.set(DRAFT_KEY, "{}").unwrap();
        assert_eq!(store.get(DRAFT_KEY).unwrap().unwrap(), "{}");

        let leftovers: Vec<_> = fs::read_dir(td.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        store.delete(DRAFT_KEY).unwrap();
        assert!(store.get(DRAFT_KEY).unwrap().is_none());

        // Deleting a missing slot is fine.
        store.delete(DRAFT_KEY).unwrap();
    }
}
