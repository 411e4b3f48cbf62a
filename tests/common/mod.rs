// tests/common/mod.rs

#![allow(dead_code)]

use spmb_registration_lib::draft::{DraftSaver, MemoryDraftStore};
use spmb_registration_lib::error::{AppError, AppResult};
use spmb_registration_lib::event_log::EventLog;
use spmb_registration_lib::form::{FormSession, SchemaVersion};
use spmb_registration_lib::submit::{SubmissionTransport, SubmitOptions};
use spmb_registration_lib::types::{DocumentSlot, FieldId, FileBlob};

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Transport fake: records every dispatched body, optionally fails.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<String>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingTransport {
    pub fn bodies(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

impl SubmissionTransport for RecordingTransport {
    fn dispatch(&self, body: &str) -> AppResult<()> {
        if *self.fail.lock().unwrap() {
            return Err(AppError::TransportFailed("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

pub struct TestEnv {
    // Keeps the event-log dir alive for the duration of the test.
    _td: tempfile::TempDir,

    pub store: MemoryDraftStore,
    pub transport: RecordingTransport,
    pub session: FormSession<MemoryDraftStore, RecordingTransport>,
}

/// Fresh session over an in-memory draft store and a recording transport,
/// with the debounce window and settle delay collapsed to zero.
pub fn setup(schema: SchemaVersion) -> TestEnv {
    setup_with_store(schema, MemoryDraftStore::new())
}

pub fn setup_with_store(schema: SchemaVersion, store: MemoryDraftStore) -> TestEnv {
    let td = tempfile::tempdir().expect("tempdir");
    let transport = RecordingTransport::default();
    let events = EventLog::init(td.path()).expect("event log init");

    let session = FormSession::new(
        schema,
        DraftSaver::with_window(store.clone(), Duration::ZERO),
        transport.clone(),
        events,
        SubmitOptions {
            settle_delay: Duration::ZERO,
        },
    );

    TestEnv {
        _td: td,
        store,
        transport,
        session,
    }
}

pub fn png_blob(name: &str, mime: &str, width: u32, height: u32) -> FileBlob {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode png fixture");

    FileBlob {
        file_name: name.to_string(),
        mime: mime.to_string(),
        bytes,
    }
}

pub fn pdf_blob(name: &str) -> FileBlob {
    FileBlob {
        file_name: name.to_string(),
        mime: "application/pdf".to_string(),
        bytes: b"%PDF-1.4 fixture".to_vec(),
    }
}

/// Drive a complete, valid registration in through the public API.
pub fn fill_valid(session: &mut FormSession<MemoryDraftStore, RecordingTransport>) {
    session.set_text(FieldId::FullName, "Budi Santoso").unwrap();
    session.set_text(FieldId::BirthPlace, "Gresik").unwrap();
    session.set_text(FieldId::BirthDate, "2013-04-12").unwrap();
    session
        .set_text(FieldId::Address, "Jl. Raya Ngasor 12")
        .unwrap();
    session
        .set_text(FieldId::PreviousSchool, "SDN Ngasor 1")
        .unwrap();
    session.set_text(FieldId::Nisn, "0123456789").unwrap();
    session.set_text(FieldId::FatherName, "Slamet").unwrap();
    session.set_text(FieldId::MotherName, "Siti").unwrap();
    session
        .set_text(FieldId::ParentWaNumber, "081234567890")
        .unwrap();
    session.toggle_info_source("Sosial Media");

    session
        .set_file(DocumentSlot::KartuKeluarga, pdf_blob("kk.pdf"))
        .unwrap();
    session
        .set_file(
            DocumentSlot::AktaKelahiran,
            png_blob("akta.jpg", "image/jpeg", 16, 16),
        )
        .unwrap();
    session
        .set_file(
            DocumentSlot::KtpWalimurid,
            png_blob("ktp.png", "image/png", 16, 16),
        )
        .unwrap();
    session
        .set_file(
            DocumentSlot::PasFoto,
            png_blob("foto.png", "image/png", 16, 16),
        )
        .unwrap();

    session.set_terms_agreed(true);
}

/// Walk the wizard forward to the final step via gated navigation.
pub fn walk_to_final(session: &mut FormSession<MemoryDraftStore, RecordingTransport>) {
    let steps = session.schema().step_count();
    for _ in 1..steps {
        assert!(session.next_step(), "step {} blocked", session.current_step());
    }
    assert_eq!(session.current_step(), steps);
}
