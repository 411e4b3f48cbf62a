// src/form/schema.rs

use crate::types::{DocumentSlot, FieldErrors, FieldId, FileBlob, FormRecord};
use regex::Regex;
use std::sync::OnceLock;

pub const MAX_FILE_BYTES: u64 = 2 * 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];
pub const ALLOWED_DOCUMENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/webp", "application/pdf"];

/// Indonesian mobile numbers: +62 / 62 / 0 prefix, then 8x, 9-13 digits total tail.
const WA_NUMBER_PATTERN: &str = r"^(\+62|62|0)8[1-9][0-9]{7,11}$";

fn wa_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(WA_NUMBER_PATTERN).expect("wa number pattern"))
}

/// Which revision of the form is live. `Survey` prepends the info-source
/// survey step; `Base` starts directly at student data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaVersion {
    Base,
    Survey,
}

impl SchemaVersion {
    pub fn step_count(self) -> u8 {
        match self {
            SchemaVersion::Base => 4,
            SchemaVersion::Survey => 5,
        }
    }

    pub fn has_survey(self) -> bool {
        matches!(self, SchemaVersion::Survey)
    }
}

const SURVEY_FIELDS: &[FieldId] = &[FieldId::InfoSource];

const STUDENT_FIELDS: &[FieldId] = &[
    FieldId::FullName,
    FieldId::BirthPlace,
    FieldId::BirthDate,
    FieldId::Address,
    FieldId::PreviousSchool,
    FieldId::Nisn,
    FieldId::Gender,
];

const PARENT_FIELDS: &[FieldId] = &[
    FieldId::FatherName,
    FieldId::FatherOccupation,
    FieldId::FatherOccupationOther,
    FieldId::MotherName,
    FieldId::MotherOccupation,
    FieldId::MotherOccupationOther,
    FieldId::ParentWaNumber,
];

const DOCUMENT_FIELDS: &[FieldId] = &[
    FieldId::KartuKeluarga,
    FieldId::AktaKelahiran,
    FieldId::KtpWalimurid,
    FieldId::PasFoto,
];

const REVIEW_FIELDS: &[FieldId] = &[FieldId::TermsAgreed];

/// Canonical step -> owned-field mapping. Steps are 1-based; an unknown step
/// owns nothing.
pub fn step_fields(schema: SchemaVersion, step: u8) -> &'static [FieldId] {
    let base_step = match schema {
        SchemaVersion::Base => step,
        SchemaVersion::Survey => {
            if step == 1 {
                return SURVEY_FIELDS;
            }
            step.saturating_sub(1)
        }
    };

    match base_step {
        1 => STUDENT_FIELDS,
        2 => PARENT_FIELDS,
        3 => DOCUMENT_FIELDS,
        4 => REVIEW_FIELDS,
        _ => &[],
    }
}

/// Single-field structural check. Pure: same (field, record) in, same answer
/// out. Cross-field rules read the sibling trigger but still attach here, on
/// the dependent field.
pub fn validate_field(
    schema: SchemaVersion,
    field: FieldId,
    record: &FormRecord,
) -> Result<(), String> {
    match check_field(schema, field, record) {
        Some(msg) => Err(msg),
        None => Ok(()),
    }
}

/// Full-record validation: every field rule of the active schema version.
pub fn validate_all(schema: SchemaVersion, record: &FormRecord) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    for step in 1..=schema.step_count() {
        for &field in step_fields(schema, step) {
            if let Some(msg) = check_field(schema, field, record) {
                errors.entry(field).or_default().push(msg);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Full validation filtered down to one step's owned fields.
///
/// Filtering a full run (instead of validating the step in isolation) keeps
/// cross-field rules evaluated against the complete record even when the
/// dependent field lives on another step. The flip side: a step can report
/// success while fields outside it are invalid, so final submission must
/// still go through `validate_all`.
pub fn validate_step(
    schema: SchemaVersion,
    step: u8,
    record: &FormRecord,
) -> Result<(), FieldErrors> {
    let owned = step_fields(schema, step);

    let mut errors = match validate_all(schema, record) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    errors.retain(|field, _| owned.contains(field));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Size/type check for a file about to be placed into a slot. Run before
/// storing so an oversized or mistyped pick never enters the record.
pub fn validate_slot_candidate(slot: DocumentSlot, blob: &FileBlob) -> Result<(), String> {
    if blob.len() > MAX_FILE_BYTES {
        return Err("Ukuran file maksimal 2MB.".to_string());
    }

    let allowed: &[&str] = if slot.accepts_pdf() {
        &ALLOWED_DOCUMENT_TYPES
    } else {
        &ALLOWED_IMAGE_TYPES
    };

    if !allowed.iter().any(|t| *t == blob.mime) {
        let msg = if slot.accepts_pdf() {
            ".pdf, .jpg, .png, or .webp files are accepted."
        } else {
            ".jpg, .png, or .webp files are accepted."
        };
        return Err(msg.to_string());
    }

    Ok(())
}

// ------------------------------------------------------
// Rule catalogue
// ------------------------------------------------------

fn check_field(schema: SchemaVersion, field: FieldId, record: &FormRecord) -> Option<String> {
    match field {
        FieldId::InfoSource => {
            if schema.has_survey() && record.info_source.is_empty() {
                return Some("Pilih minimal satu sumber informasi".to_string());
            }
            None
        }

        FieldId::FullName => required_text(&record.full_name, "Nama lengkap wajib diisi"),
        FieldId::BirthPlace => required_text(&record.birth_place, "Tempat lahir wajib diisi"),
        FieldId::BirthDate => required_text(&record.birth_date, "Tanggal lahir wajib diisi"),
        FieldId::Address => required_text(&record.address, "Alamat lengkap wajib diisi"),
        FieldId::PreviousSchool => {
            required_text(&record.previous_school, "Asal sekolah wajib diisi")
        }

        FieldId::Nisn => {
            if !is_nisn(&record.nisn) {
                return Some("NISN harus terdiri dari 10 digit angka".to_string());
            }
            None
        }

        // Enum-typed fields cannot hold an out-of-range value.
        FieldId::Gender | FieldId::FatherOccupation | FieldId::MotherOccupation => None,

        FieldId::FatherName => required_text(&record.father_name, "Nama ayah wajib diisi"),
        FieldId::MotherName => required_text(&record.mother_name, "Nama ibu wajib diisi"),

        FieldId::FatherOccupationOther => {
            if record.father_occupation.is_other()
                && record.father_occupation_other.trim().is_empty()
            {
                return Some("Pekerjaan Ayah wajib diisi".to_string());
            }
            None
        }
        FieldId::MotherOccupationOther => {
            if record.mother_occupation.is_other()
                && record.mother_occupation_other.trim().is_empty()
            {
                return Some("Pekerjaan Ibu wajib diisi".to_string());
            }
            None
        }

        FieldId::ParentWaNumber => {
            if !wa_number_re().is_match(&record.parent_wa_number) {
                return Some("No. WA tidak valid, contoh: 08123456789".to_string());
            }
            None
        }

        FieldId::KartuKeluarga => check_slot(record, DocumentSlot::KartuKeluarga),
        FieldId::AktaKelahiran => check_slot(record, DocumentSlot::AktaKelahiran),
        FieldId::KtpWalimurid => check_slot(record, DocumentSlot::KtpWalimurid),
        FieldId::PasFoto => check_slot(record, DocumentSlot::PasFoto),

        FieldId::TermsAgreed => {
            if !record.terms_agreed {
                return Some("Anda wajib menyetujui pernyataan pendaftaran".to_string());
            }
            None
        }
    }
}

fn required_text(value: &str, msg: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(msg.to_string())
    } else {
        None
    }
}

fn check_slot(record: &FormRecord, slot: DocumentSlot) -> Option<String> {
    let Some(blob) = record.slot(slot) else {
        return Some(format!("{} wajib diunggah", slot.label()));
    };

    validate_slot_candidate(slot, blob).err()
}

fn is_nisn(s: &str) -> bool {
    s.len() == 10 && s.bytes().all(|b| b.is_ascii_digit())
}

// ======================================================
// Unit Tests
// ======================================================
