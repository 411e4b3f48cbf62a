// tests/step_gating.rs

mod common;

use common::{fill_valid, pdf_blob, png_blob, setup};
use spmb_registration_lib::form::SchemaVersion;
use spmb_registration_lib::types::{DocumentSlot, FieldId, FileBlob, SubmissionStatus};

#[test]
fn empty_form_is_blocked_at_the_first_step() {
    let mut env = setup(SchemaVersion::Survey);

    assert!(!env.session.next_step());
    assert_eq!(env.session.current_step(), 1);
    assert_eq!(env.session.first_error_field(), Some(FieldId::InfoSource));
}

#[test]
fn step_errors_never_mention_fields_from_other_steps() {
    let mut env = setup(SchemaVersion::Survey);
    fill_valid(&mut env.session);

    // Break one field on the student step and one on the documents step.
    env.session.set_text(FieldId::Nisn, "123").unwrap();
    env.session.clear_file(DocumentSlot::PasFoto);

    env.session.toggle_info_source("Keluarga/Teman");
    assert!(env.session.next_step(), "survey step should pass");

    // Student step reports only its own problem.
    assert!(!env.session.next_step());
    let errors = env.session.errors();
    assert!(errors.contains_key(&FieldId::Nisn));
    assert!(!errors.contains_key(&FieldId::PasFoto));

    // Fixing the student field lets us through to the parent step, which is
    // clean even though the documents step still is not.
    env.session.set_text(FieldId::Nisn, "0123456789").unwrap();
    assert!(env.session.next_step());
    assert!(env.session.next_step(), "parent step should pass");

    // The documents step now surfaces the missing photo.
    assert!(!env.session.next_step());
    assert_eq!(env.session.first_error_field(), Some(FieldId::PasFoto));
}

#[test]
fn numeric_inputs_mask_as_the_user_types() {
    let mut env = setup(SchemaVersion::Base);

    env.session.set_text(FieldId::Nisn, "08a1b2").unwrap();
    assert_eq!(env.session.record().nisn, "0812");

    env.session
        .set_text(FieldId::ParentWaNumber, "+62 812-3456-7890")
        .unwrap();
    assert_eq!(env.session.record().parent_wa_number, "6281234567890");
}

#[test]
fn oversized_uploads_are_rejected_before_storage() {
    let mut env = setup(SchemaVersion::Base);

    let three_mib = FileBlob {
        file_name: "besar.jpg".to_string(),
        mime: "image/jpeg".to_string(),
        bytes: vec![0u8; 3 * 1024 * 1024],
    };

    for slot in [
        DocumentSlot::KartuKeluarga,
        DocumentSlot::AktaKelahiran,
        DocumentSlot::KtpWalimurid,
        DocumentSlot::PasFoto,
    ] {
        let msg = env.session.set_file(slot, three_mib.clone()).unwrap_err();
        assert_eq!(msg, "Ukuran file maksimal 2MB.");
        assert!(env.session.record().slot(slot).is_none());
    }
}

#[test]
fn photo_slot_is_image_only() {
    let mut env = setup(SchemaVersion::Base);

    let err = env
        .session
        .set_file(DocumentSlot::PasFoto, pdf_blob("foto.pdf"))
        .unwrap_err();
    assert_eq!(err, ".jpg, .png, or .webp files are accepted.");

    env.session
        .set_file(DocumentSlot::KtpWalimurid, pdf_blob("ktp.pdf"))
        .unwrap();
    assert!(env.session.record().ktp_walimurid.is_some());
}

#[test]
fn review_jump_allows_editing_and_resubmitting() {
    let mut env = setup(SchemaVersion::Base);
    fill_valid(&mut env.session);

    env.session.jump_to_step(4);
    assert_eq!(env.session.current_step(), 4);

    // Jump back to fix the photo, then return to review and submit.
    env.session.jump_to_step(3);
    env.session
        .set_file(DocumentSlot::PasFoto, png_blob("baru.png", "image/png", 8, 8))
        .unwrap();
    env.session.jump_to_step(4);

    assert_eq!(env.session.submit(), SubmissionStatus::Success);
}

#[test]
fn backward_navigation_floors_at_the_first_step() {
    let mut env = setup(SchemaVersion::Base);

    env.session.jump_to_step(2);
    env.session.prev_step();
    assert_eq!(env.session.current_step(), 1);
    env.session.prev_step();
    assert_eq!(env.session.current_step(), 1);
}
