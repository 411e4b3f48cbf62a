// src/encode.rs

use crate::error::{AppError, AppResult};
use crate::types::{DocumentSlot, FileBlob, FormRecord, DOCUMENT_SLOTS};

use base64::{engine::general_purpose, Engine as _};
use image::imageops::FilterType;
use std::collections::BTreeMap;

/// Images wider than this are downscaled proportionally before embedding.
pub const MAX_IMAGE_WIDTH: u32 = 500;
pub const JPEG_QUALITY: u8 = 50;

/// Text-embeddable form of one uploaded file. `base64` is always header-free;
/// `mime` is the blob's declared type (the collaborator keys off it).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedFile {
    pub base64: String,
    pub mime: String,
}

/// Encode one file for embedding. Image types are resampled (width capped,
/// lossy JPEG re-encode) to keep the payload small enough for the
/// collaborator; everything else is embedded byte-for-byte. The input blob is
/// never mutated.
pub fn encode_file(blob: &FileBlob) -> AppResult<EncodedFile> {
    let bytes = if blob.is_image() {
        resample_image(&blob.bytes)?
    } else {
        blob.bytes.clone()
    };

    let b64 = general_purpose::STANDARD.encode(&bytes);

    Ok(EncodedFile {
        base64: strip_base64_header(&b64).to_string(),
        mime: blob.mime.clone(),
    })
}

/// Encode every document slot in parallel. Absent slots stay `None`. Any
/// single failure fails the whole call; there are no partial results.
pub fn encode_slots(
    record: &FormRecord,
) -> AppResult<BTreeMap<DocumentSlot, Option<EncodedFile>>> {
    let results: Vec<(DocumentSlot, AppResult<Option<EncodedFile>>)> = std::thread::scope(|s| {
        let handles: Vec<_> = DOCUMENT_SLOTS
            .iter()
            .map(|&slot| {
                let blob = record.slot(slot);
                (slot, s.spawn(move || blob.map(encode_file).transpose()))
            })
            .collect();

        handles
            .into_iter()
            .map(|(slot, h)| {
                let res = h.join().unwrap_or(Err(AppError::EncodeWorkerLost));
                (slot, res)
            })
            .collect()
    });

    let mut out = BTreeMap::new();
    for (slot, res) in results {
        out.insert(slot, res?);
    }
    Ok(out)
}

/// Strip a `data:*;base64,` header if one is present. Embedding consumers
/// require the raw alphabet with no prefix.
pub fn strip_base64_header(s: &str) -> &str {
    match s.find("base64,") {
        Some(idx) => &s[idx + "base64,".len()..],
        None => s,
    }
}

fn resample_image(bytes: &[u8]) -> AppResult<Vec<u8>> {
    let img =
        image::load_from_memory(bytes).map_err(|e| AppError::ImageDecodeFailed(e.to_string()))?;

    let img = if img.width() > MAX_IMAGE_WIDTH {
        img.resize(MAX_IMAGE_WIDTH, u32::MAX, FilterType::Triangle)
    } else {
        img
    };

    // JPEG has no alpha channel.
    let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());

    let mut out = Vec::new();
    rgb.write_with_encoder(image::codecs::jpeg::JpegEncoder::new_with_quality(
        &mut out,
        JPEG_QUALITY,
    ))
    .map_err(|e| AppError::ImageEncodeFailed(e.to_string()))?;

    Ok(out)
}

// ======================================================
// Unit Tests
// ======================================================
