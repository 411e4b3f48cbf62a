// src/form/test_support.rs

#![cfg(test)]

use crate::types::{FileBlob, FormRecord};

pub fn blob(mime: &str, len: usize) -> FileBlob {
    FileBlob {
        file_name: format!("f.{}", mime.rsplit('/').next().unwrap_or("bin")),
        mime: mime.to_string(),
        bytes: vec![0u8; len],
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([12, 200, 30]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

pub fn png_blob(name: &str, mime: &str, width: u32, height: u32) -> FileBlob {
    FileBlob {
        file_name: name.to_string(),
        mime: mime.to_string(),
        bytes: png_bytes(width, height),
    }
}

/// A record that passes full validation on both schema versions. Image slots
/// hold real decodable pixels so the encode pipeline also accepts them.
pub fn valid_record() -> FormRecord {
    let mut r = FormRecord::default();
    r.full_name = "Budi Santoso".to_string();
    r.birth_place = "Gresik".to_string();
    r.birth_date = "2013-04-12".to_string();
    r.address = "Jl. Raya Ngasor 12".to_string();
    r.previous_school = "SDN Ngasor 1".to_string();
    r.nisn = "0123456789".to_string();
    r.father_name = "Slamet".to_string();
    r.mother_name = "Siti".to_string();
    r.parent_wa_number = "081234567890".to_string();
    r.info_source.insert("Sosial Media".to_string());
    r.kartu_keluarga = Some(FileBlob {
        file_name: "kk.pdf".to_string(),
        mime: "application/pdf".to_string(),
        bytes: b"%PDF-1.4 fake".to_vec(),
    });
    r.akta_kelahiran = Some(png_blob("akta.jpg", "image/jpeg", 16, 16));
    r.ktp_walimurid = Some(png_blob("ktp.png", "image/png", 16, 16));
    r.pas_foto = Some(png_blob("foto.webp", "image/webp", 16, 16));
    r.terms_agreed = true;
    r
}
