// src/submit.rs

use crate::encode;
use crate::error::{AppError, AppResult};
use crate::form::schema::{self, SchemaVersion};
use crate::types::{DocumentSlot, FieldErrors, FormRecord, ParentOccupation};

use serde::Serialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const REG_ID_PREFIX: &str = "AR-RIDHO-";

/// How long to wait after dispatch before declaring success. The endpoint's
/// response is unreadable, so this stands in for a real acknowledgment: it
/// gives the collaborator time to finish writing attachments before the
/// applicant is told it is safe to leave.
pub const SETTLE_DELAY: Duration = Duration::from_secs(8);

#[derive(Clone, Copy, Debug)]
pub struct SubmitOptions {
    pub settle_delay: Duration,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            settle_delay: SETTLE_DELAY,
        }
    }
}

/// One outbound dispatch. Success means "request left without exception",
/// never "collaborator accepted the data".
pub trait SubmissionTransport {
    fn dispatch(&self, body: &str) -> AppResult<()>;
}

/// POSTs the JSON body as plain text to the spreadsheet web-app endpoint,
/// with a cache-busting timestamp query.
pub struct SheetTransport {
    url: String,
    client: reqwest::blocking::Client,
}

impl SheetTransport {
    pub fn new(url: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| AppError::TransportInitFailed(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl SubmissionTransport for SheetTransport {
    fn dispatch(&self, body: &str) -> AppResult<()> {
        let url = format!("{}?t={}", self.url, now_ms());

        // Response intentionally dropped: the endpoint does not expose a
        // readable body to this caller.
        self.client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body.to_string())
            .send()
            .map_err(|e| AppError::TransportFailed(e.to_string()))?;

        Ok(())
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Accepted { registration_id: String },
    Rejected(FieldErrors),
}

/// Run the full submission pipeline: validate, assemble, dispatch, settle.
/// Validation failures come back as data; encode and transport failures
/// propagate as errors for the caller to map to a server-error state.
pub fn submit(
    schema: SchemaVersion,
    record: &FormRecord,
    transport: &dyn SubmissionTransport,
    opts: &SubmitOptions,
) -> AppResult<SubmitOutcome> {
    if let Err(errors) = schema::validate_all(schema, record) {
        return Ok(SubmitOutcome::Rejected(errors));
    }

    let registration_id = generate_registration_id();
    let payload = build_payload(record, &registration_id)?;
    let body = serde_json::to_string(&payload)
        .map_err(|e| AppError::PayloadSerializeFailed(e.to_string()))?;

    transport.dispatch(&body)?;

    std::thread::sleep(opts.settle_delay);

    Ok(SubmitOutcome::Accepted { registration_id })
}

/// Fixed prefix plus the tail of the millisecond clock. Collisions are
/// accepted as negligible at the expected submission rate.
pub fn generate_registration_id() -> String {
    let ms = now_ms().to_string();
    let tail = &ms[ms.len().saturating_sub(6)..];
    format!("{REG_ID_PREFIX}{tail}")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionPayload {
    full_name: String,
    nisn: String,
    gender: String,
    birth_place: String,
    birth_date: String,
    previous_school: String,
    address: String,
    father_name: String,
    father_occupation: String,
    mother_name: String,
    mother_occupation: String,
    parent_wa_number: String,
    info_source: String,
    reg_id: String,
    kartu_keluarga_base64: String,
    kartu_keluarga_mime: String,
    akta_kelahiran_base64: String,
    akta_kelahiran_mime: String,
    ktp_walimurid_base64: String,
    ktp_walimurid_mime: String,
    pas_foto_base64: String,
    pas_foto_mime: String,
}

fn build_payload(record: &FormRecord, registration_id: &str) -> AppResult<SubmissionPayload> {
    let mut slots = encode::encode_slots(record)?;

    let mut pair = |slot: DocumentSlot| match slots.remove(&slot).flatten() {
        Some(enc) => (enc.base64, enc.mime),
        None => (String::new(), String::new()),
    };

    let (kartu_keluarga_base64, kartu_keluarga_mime) = pair(DocumentSlot::KartuKeluarga);
    let (akta_kelahiran_base64, akta_kelahiran_mime) = pair(DocumentSlot::AktaKelahiran);
    let (ktp_walimurid_base64, ktp_walimurid_mime) = pair(DocumentSlot::KtpWalimurid);
    let (pas_foto_base64, pas_foto_mime) = pair(DocumentSlot::PasFoto);

    Ok(SubmissionPayload {
        full_name: record.full_name.trim().to_string(),
        nisn: record.nisn.trim().to_string(),
        gender: record.gender.label().to_string(),
        birth_place: record.birth_place.trim().to_string(),
        birth_date: record.birth_date.trim().to_string(),
        previous_school: record.previous_school.trim().to_string(),
        address: record.address.trim().to_string(),
        father_name: record.father_name.trim().to_string(),
        father_occupation: effective_occupation(
            record.father_occupation,
            &record.father_occupation_other,
        ),
        mother_name: record.mother_name.trim().to_string(),
        mother_occupation: effective_occupation(
            record.mother_occupation,
            &record.mother_occupation_other,
        ),
        parent_wa_number: record.parent_wa_number.trim().to_string(),
        info_source: joined_info_source(record),
        reg_id: registration_id.to_string(),
        kartu_keluarga_base64,
        kartu_keluarga_mime,
        akta_kelahiran_base64,
        akta_kelahiran_mime,
        ktp_walimurid_base64,
        ktp_walimurid_mime,
        pas_foto_base64,
        pas_foto_mime,
    })
}

/// The enum label, or the free-text detail when the "other" variant is
/// selected.
fn effective_occupation(occupation: ParentOccupation, other: &str) -> String {
    if occupation.is_other() {
        other.trim().to_string()
    } else {
        occupation.label().to_string()
    }
}

fn joined_info_source(record: &FormRecord) -> String {
    record
        .info_source
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
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
