// src/confirm.rs

use crate::context::{ADMIN_WA_NUMBER, SCHOOL_NAME};

/// Deep link opening a WhatsApp chat with the admin, pre-filled with a
/// confirmation message naming the applicant and registration ID.
pub fn whatsapp_confirmation_link(full_name: &str, registration_id: &str) -> String {
    let message = format!(
        "Assalamu'alaikum Admin, saya sudah mendaftar Online di {SCHOOL_NAME}.\n\n\
         Nama Siswa: *{full_name}*\n\
         ID Pendaftaran: *{registration_id}*\n\n\
         Mohon dicek. Terima kasih."
    );

    format!(
        "https://wa.me/{ADMIN_WA_NUMBER}?text={}",
        percent_encode(&message)
    )
}

/// `encodeURIComponent` semantics: alphanumerics and `-_.!~*'()` pass
/// through, every other byte becomes `%XX`.
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 3);

    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => out.push(b as char),
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => out.push(b as char),
            _ => {
                out.push('%');
                out.push(hex_upper(b >> 4));
                out.push(hex_upper(b & 0x0f));
            }
        }
    }

    out
}

fn hex_upper(nibble: u8) -> char {
    char::from_digit(nibble as u32, 16)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('0')
}

// ======================================================
// Unit Tests
// ======================================================
