// src/types.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Sparse field -> message mapping. An absent key means the field is
/// currently considered valid.
pub type FieldErrors = BTreeMap<FieldId, Vec<String>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    #[serde(rename = "Laki-laki")]
    LakiLaki,
    #[serde(rename = "Perempuan")]
    Perempuan,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::LakiLaki => "Laki-laki",
            Gender::Perempuan => "Perempuan",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentOccupation {
    #[serde(rename = "PNS")]
    Pns,
    #[serde(rename = "TNI/POLRI")]
    TniPolri,
    #[default]
    #[serde(rename = "Wiraswasta")]
    Wiraswasta,
    #[serde(rename = "Karyawan Swasta")]
    KaryawanSwasta,
    #[serde(rename = "Petani")]
    Petani,
    #[serde(rename = "Nelayan")]
    Nelayan,
    #[serde(rename = "Ibu Rumah Tangga")]
    Irt,
    #[serde(rename = "Tidak Bekerja")]
    TidakBekerja,
    #[serde(rename = "Lainnya...")]
    Lainnya,
}

impl ParentOccupation {
    pub fn label(self) -> &'static str {
        match self {
            ParentOccupation::Pns => "PNS",
            ParentOccupation::TniPolri => "TNI/POLRI",
            ParentOccupation::Wiraswasta => "Wiraswasta",
            ParentOccupation::KaryawanSwasta => "Karyawan Swasta",
            ParentOccupation::Petani => "Petani",
            ParentOccupation::Nelayan => "Nelayan",
            ParentOccupation::Irt => "Ibu Rumah Tangga",
            ParentOccupation::TidakBekerja => "Tidak Bekerja",
            ParentOccupation::Lainnya => "Lainnya...",
        }
    }

    /// The "other" variant that requires the paired free-text detail field.
    pub fn is_other(self) -> bool {
        matches!(self, ParentOccupation::Lainnya)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParentRole {
    Father,
    Mother,
}

/// A user-selected file: name, declared MIME type, raw bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FileBlob {
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

impl fmt::Debug for FileBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bytes elided: blobs can be megabytes.
        f.debug_struct("FileBlob")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// The four document upload slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DocumentSlot {
    KartuKeluarga,
    AktaKelahiran,
    KtpWalimurid,
    PasFoto,
}

pub const DOCUMENT_SLOTS: [DocumentSlot; 4] = [
    DocumentSlot::KartuKeluarga,
    DocumentSlot::AktaKelahiran,
    DocumentSlot::KtpWalimurid,
    DocumentSlot::PasFoto,
];

impl DocumentSlot {
    pub fn field(self) -> FieldId {
        match self {
            DocumentSlot::KartuKeluarga => FieldId::KartuKeluarga,
            DocumentSlot::AktaKelahiran => FieldId::AktaKelahiran,
            DocumentSlot::KtpWalimurid => FieldId::KtpWalimurid,
            DocumentSlot::PasFoto => FieldId::PasFoto,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentSlot::KartuKeluarga => "Kartu Keluarga",
            DocumentSlot::AktaKelahiran => "Akta Kelahiran",
            DocumentSlot::KtpWalimurid => "KTP Wali Murid",
            DocumentSlot::PasFoto => "Pas Foto",
        }
    }

    /// The photo slot only accepts image types; the rest also take PDF.
    pub fn accepts_pdf(self) -> bool {
        !matches!(self, DocumentSlot::PasFoto)
    }
}

/// Every validatable form field, declared in form order. The derived `Ord`
/// makes ordered error-map iteration yield the first invalid field on screen,
/// which is what the presentation layer scrolls to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldId {
    InfoSource,
    FullName,
    BirthPlace,
    BirthDate,
    Address,
    PreviousSchool,
    Nisn,
    Gender,
    FatherName,
    FatherOccupation,
    FatherOccupationOther,
    MotherName,
    MotherOccupation,
    MotherOccupationOther,
    ParentWaNumber,
    KartuKeluarga,
    AktaKelahiran,
    KtpWalimurid,
    PasFoto,
    TermsAgreed,
}

impl FieldId {
    /// Wire / DOM-id name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldId::InfoSource => "infoSource",
            FieldId::FullName => "fullName",
            FieldId::BirthPlace => "birthPlace",
            FieldId::BirthDate => "birthDate",
            FieldId::Address => "address",
            FieldId::PreviousSchool => "previousSchool",
            FieldId::Nisn => "nisn",
            FieldId::Gender => "gender",
            FieldId::FatherName => "fatherName",
            FieldId::FatherOccupation => "fatherOccupation",
            FieldId::FatherOccupationOther => "fatherOccupationOther",
            FieldId::MotherName => "motherName",
            FieldId::MotherOccupation => "motherOccupation",
            FieldId::MotherOccupationOther => "motherOccupationOther",
            FieldId::ParentWaNumber => "parentWaNumber",
            FieldId::KartuKeluarga => "kartuKeluarga",
            FieldId::AktaKelahiran => "aktaKelahiran",
            FieldId::KtpWalimurid => "ktpWalimurid",
            FieldId::PasFoto => "pasFoto",
            FieldId::TermsAgreed => "termsAgreed",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Success,
    Error,
    ServerError,
}

/// The single mutable aggregate holding one registration attempt.
#[derive(Clone, Debug)]
pub struct FormRecord {
    /// Honeypot. Hidden from humans; non-empty means a bot filled it.
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

    /// Survey tags: where the applicant heard about the school.
    pub info_source: BTreeSet<String>,

    pub kartu_keluarga: Option<FileBlob>,
    pub akta_kelahiran: Option<FileBlob>,
    pub ktp_walimurid: Option<FileBlob>,
    pub pas_foto: Option<FileBlob>,

    pub terms_agreed: bool,
}

impl Default for FormRecord {
    fn default() -> Self {
        Self {
            bot_field: String::new(),
            full_name: String::new(),
            birth_place: String::new(),
            birth_date: String::new(),
            address: String::new(),
            previous_school: String::new(),
            nisn: String::new(),
            gender: Gender::LakiLaki,
            father_name: String::new(),
            father_occupation: ParentOccupation::Wiraswasta,
            father_occupation_other: String::new(),
            mother_name: String::new(),
            mother_occupation: ParentOccupation::Irt,
            mother_occupation_other: String::new(),
            parent_wa_number: String::new(),
            info_source: BTreeSet::new(),
            kartu_keluarga: None,
            akta_kelahiran: None,
            ktp_walimurid: None,
            pas_foto: None,
            terms_agreed: false,
        }
    }
}

impl FormRecord {
    pub fn slot(&self, slot: DocumentSlot) -> Option<&FileBlob> {
        match slot {
            DocumentSlot::KartuKeluarga => self.kartu_keluarga.as_ref(),
            DocumentSlot::AktaKelahiran => self.akta_kelahiran.as_ref(),
            DocumentSlot::KtpWalimurid => self.ktp_walimurid.as_ref(),
            DocumentSlot::PasFoto => self.pas_foto.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: DocumentSlot) -> &mut Option<FileBlob> {
        match slot {
            DocumentSlot::KartuKeluarga => &mut self.kartu_keluarga,
            DocumentSlot::AktaKelahiran => &mut self.akta_kelahiran,
            DocumentSlot::KtpWalimurid => &mut self.ktp_walimurid,
            DocumentSlot::PasFoto => &mut self.pas_foto,
        }
    }
}

// ======================================================
// Unit Tests
// ======================================================
