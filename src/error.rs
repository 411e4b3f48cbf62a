// src/error.rs

use std::fmt;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserMsgKind {
    Success,
    Warn,
    Error,
    Info,
}

#[derive(Clone, Debug)]
pub struct UserMsg {
    pub kind: UserMsgKind,
    pub short: &'static str,
    pub detail: Option<String>,
}

#[derive(Debug)]
pub enum AppError {
    // --------------------------------------------------
    // generic / plumbing
    // --------------------------------------------------
    Io(std::io::Error),
    Msg(String),
    NotATextField(&'static str),

    // --------------------------------------------------
    // draft persistence
    // --------------------------------------------------
    DraftReadFailed(String),
    DraftInvalidJson(String),
    DraftWriteFailed(String),
    DraftSyncFailed(String),
    DraftRenameFailed(String),
    DraftDeleteFailed(String),

    // --------------------------------------------------
    // file encoding
    // --------------------------------------------------
    ImageDecodeFailed(String),
    ImageEncodeFailed(String),
    EncodeWorkerLost,

    // --------------------------------------------------
    // submission
    // --------------------------------------------------
    PayloadSerializeFailed(String),
    TransportInitFailed(String),
    TransportFailed(String),
}

impl AppError {
    pub fn user_msg(&self) -> UserMsg {
        use AppError::*;

        let kind = UserMsgKind::Error;
        let detail = Some(self.to_string());

        let short: &'static str = match self {
            Io(_) => "Operasi berkas gagal.",
            Msg(_) => "Operasi gagal.",
            NotATextField(_) => "Isian tidak dikenali.",

            DraftReadFailed(_) => "Gagal membaca draf tersimpan.",
            DraftInvalidJson(_) => "Draf tersimpan rusak.",
            DraftWriteFailed(_) | DraftSyncFailed(_) | DraftRenameFailed(_) => {
                "Gagal menyimpan draf."
            }
            DraftDeleteFailed(_) => "Gagal menghapus draf.",

            ImageDecodeFailed(_) | ImageEncodeFailed(_) => "File gambar tidak dapat diproses.",
            EncodeWorkerLost => "Pemrosesan file terhenti.",

            PayloadSerializeFailed(_) => "Gagal menyiapkan data pendaftaran.",
            TransportInitFailed(_) | TransportFailed(_) => {
                "Server sedang mengalami gangguan komunikasi."
            }
        };

        UserMsg {
            kind,
            short,
            detail,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AppError::*;

        match self {
            Io(e) => write!(f, "io error: {e}"),
            Msg(s) => write!(f, "{s}"),
            NotATextField(name) => write!(f, "'{name}' is not a text field"),

            DraftReadFailed(s) => write!(f, "draft read failed: {s}"),
            DraftInvalidJson(s) => write!(f, "draft invalid json: {s}"),
            DraftWriteFailed(s) => write!(f, "draft write failed: {s}"),
            DraftSyncFailed(s) => write!(f, "draft sync failed: {s}"),
            DraftRenameFailed(s) => write!(f, "draft rename failed: {s}"),
            DraftDeleteFailed(s) => write!(f, "draft delete failed: {s}"),

            ImageDecodeFailed(s) => write!(f, "image decode failed: {s}"),
            ImageEncodeFailed(s) => write!(f, "image encode failed: {s}"),
            EncodeWorkerLost => write!(f, "file encode worker lost"),

            PayloadSerializeFailed(s) => write!(f, "payload serialize failed: {s}"),
            TransportInitFailed(s) => write!(f, "transport init failed: {s}"),
            TransportFailed(s) => write!(f, "transport dispatch failed: {s}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e)
    }
}

// ======================================================
// Unit Tests
// ======================================================
