// src/form/controller.rs

use crate::confirm;
use crate::draft::{DraftSaver, DraftStore};
use crate::error::{AppError, AppResult};
use crate::event_log::EventLog;
use crate::form::nav;
use crate::form::schema::{self, SchemaVersion};
use crate::submit::{self, SubmissionTransport, SubmitOptions, SubmitOutcome};
use crate::types::{
    DocumentSlot, FieldErrors, FieldId, FileBlob, FormRecord, Gender, ParentOccupation,
    ParentRole, SubmissionStatus,
};

/// Single source of truth for one registration attempt: record, step cursor,
/// error map, submission status. All mutations go through here; the
/// presentation layer renders whatever this exposes and forwards events back.
pub struct FormSession<S: DraftStore, T: SubmissionTransport> {
    schema: SchemaVersion,
    record: FormRecord,
    current_step: u8,
    errors: FieldErrors,
    status: SubmissionStatus,
    registration_id: Option<String>,
    draft_restored: bool,

    draft: DraftSaver<S>,
    transport: T,
    events: EventLog,
    submit_opts: SubmitOptions,
}

impl<S: DraftStore, T: SubmissionTransport> FormSession<S, T> {
    pub fn new(
        schema: SchemaVersion,
        draft: DraftSaver<S>,
        transport: T,
        mut events: EventLog,
        submit_opts: SubmitOptions,
    ) -> Self {
        let mut record = FormRecord::default();
        let mut draft_restored = false;

        match draft.load() {
            Ok(Some(stored)) => {
                stored.apply(&mut record);
                draft_restored = true;
                events.record(
                    "draft_restored",
                    "session_init",
                    "stored draft merged into fresh record",
                );
            }
            Ok(None) => {}
            Err(e) => {
                // Non-fatal: a broken draft falls back to defaults.
                events.record("draft_restore_failed", "session_init", &e.to_string());
            }
        }

        Self {
            schema,
            record,
            current_step: 1,
            errors: FieldErrors::new(),
            status: SubmissionStatus::Idle,
            registration_id: None,
            draft_restored,
            draft,
            transport,
            events,
            submit_opts,
        }
    }

    // --------------------------------------------------
    // Accessors
    // --------------------------------------------------

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn current_step(&self) -> u8 {
        self.current_step
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// First invalid field in form order; the presentation scrolls to it.
    pub fn first_error_field(&self) -> Option<FieldId> {
        self.errors.keys().next().copied()
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn registration_id(&self) -> Option<&str> {
        self.registration_id.as_deref()
    }

    pub fn draft_restored(&self) -> bool {
        self.draft_restored
    }

    pub fn recent_events(&self) -> Vec<crate::event_log::FormEvent> {
        self.events.recent()
    }

    /// WhatsApp deep link for the confirmation message, once submission has
    /// actually gone through.
    pub fn confirmation_link(&self) -> Option<String> {
        match (&self.status, &self.registration_id) {
            (SubmissionStatus::Success, Some(id)) => {
                Some(confirm::whatsapp_confirmation_link(&self.record.full_name, id))
            }
            _ => None,
        }
    }

    // --------------------------------------------------
    // Field mutations
    // --------------------------------------------------

    pub fn set_text(&mut self, field: FieldId, value: &str) -> AppResult<()> {
        let slot = match field {
            FieldId::FullName => &mut self.record.full_name,
            FieldId::BirthPlace => &mut self.record.birth_place,
            FieldId::BirthDate => &mut self.record.birth_date,
            FieldId::Address => &mut self.record.address,
            FieldId::PreviousSchool => &mut self.record.previous_school,
            FieldId::FatherName => &mut self.record.father_name,
            FieldId::FatherOccupationOther => &mut self.record.father_occupation_other,
            FieldId::MotherName => &mut self.record.mother_name,
            FieldId::MotherOccupationOther => &mut self.record.mother_occupation_other,

            // Numeric-only inputs mask instead of rejecting keystrokes.
            FieldId::Nisn => {
                self.record.nisn = digits_only(value);
                self.after_change();
                return Ok(());
            }
            FieldId::ParentWaNumber => {
                self.record.parent_wa_number = digits_only(value);
                self.after_change();
                return Ok(());
            }

            _ => return Err(AppError::NotATextField(field.as_str())),
        };

        *slot = value.to_string();
        self.after_change();
        Ok(())
    }

    /// Honeypot input. Humans never see the field; only bots write here.
    pub fn set_bot_field(&mut self, value: &str) {
        self.record.bot_field = value.to_string();
        self.after_change();
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.record.gender = gender;
        self.after_change();
    }

    pub fn set_occupation(&mut self, role: ParentRole, occupation: ParentOccupation) {
        match role {
            ParentRole::Father => self.record.father_occupation = occupation,
            ParentRole::Mother => self.record.mother_occupation = occupation,
        }
        self.after_change();
    }

    pub fn toggle_info_source(&mut self, label: &str) {
        if !self.record.info_source.remove(label) {
            self.record.info_source.insert(label.to_string());
        }
        self.after_change();
    }

    pub fn set_terms_agreed(&mut self, agreed: bool) {
        self.record.terms_agreed = agreed;
        self.after_change();
    }

    /// Place a file into a slot. Oversized or mistyped candidates are
    /// rejected here and never enter the record.
    pub fn set_file(&mut self, slot: DocumentSlot, blob: FileBlob) -> Result<(), String> {
        if let Err(msg) = schema::validate_slot_candidate(slot, &blob) {
            self.errors.insert(slot.field(), vec![msg.clone()]);
            return Err(msg);
        }

        *self.record.slot_mut(slot) = Some(blob);
        self.errors.remove(&slot.field());
        self.after_change();
        Ok(())
    }

    pub fn clear_file(&mut self, slot: DocumentSlot) {
        *self.record.slot_mut(slot) = None;
        self.after_change();
    }

    /// Blur a field: trim its text and synchronously re-run the single-field
    /// check, updating the error map either way.
    pub fn blur(&mut self, field: FieldId) {
        self.trim_field(field);

        match schema::validate_field(self.schema, field, &self.record) {
            Ok(()) => {
                self.errors.remove(&field);
            }
            Err(msg) => {
                self.errors.insert(field, vec![msg]);
            }
        }
    }

    // --------------------------------------------------
    // Navigation
    // --------------------------------------------------

    /// Forward navigation, gated on the current step's fields. Returns
    /// whether the step advanced.
    pub fn next_step(&mut self) -> bool {
        match schema::validate_step(self.schema, self.current_step, &self.record) {
            Ok(()) => {
                self.errors.clear();
                self.current_step = nav::advance(self.schema, self.current_step);
                true
            }
            Err(errors) => {
                self.errors = errors;
                false
            }
        }
    }

    pub fn prev_step(&mut self) {
        self.current_step = nav::back(self.current_step);
    }

    /// Ungated jump; the review screen uses this to edit earlier steps.
    pub fn jump_to_step(&mut self, target: u8) {
        self.current_step = nav::jump(self.schema, target);
    }

    // --------------------------------------------------
    // Submission
    // --------------------------------------------------

    /// Drive the submit button. Away from the final step this behaves like
    /// forward navigation. At the final step it runs the pipeline and maps
    /// the outcome onto the status machine; no failure escapes.
    pub fn submit(&mut self) -> SubmissionStatus {
        if self.status != SubmissionStatus::Idle {
            return self.status;
        }

        if !self.record.bot_field.is_empty() {
            // Pretend success without dispatching anything, so the defense
            // stays invisible to whatever filled the hidden field.
            self.events.record(
                "bot_detected",
                "submit",
                "honeypot field non-empty; dispatch skipped",
            );
            self.status = SubmissionStatus::Success;
            return self.status;
        }

        if !nav::is_final_step(self.schema, self.current_step) {
            self.next_step();
            return self.status;
        }

        match submit::submit(self.schema, &self.record, &self.transport, &self.submit_opts) {
            Ok(SubmitOutcome::Accepted { registration_id }) => {
                if let Err(e) = self.draft.clear() {
                    self.events.record("draft_clear_failed", "submit", &e.to_string());
                }
                self.events
                    .record("submission_succeeded", "submit", &registration_id);
                self.registration_id = Some(registration_id);
                self.errors.clear();
                self.status = SubmissionStatus::Success;
            }
            Ok(SubmitOutcome::Rejected(errors)) => {
                self.errors = errors;
            }
            Err(e) => {
                self.events
                    .record("submission_failed", "submit", &e.to_string());
                self.status = SubmissionStatus::ServerError;
            }
        }

        self.status
    }

    /// From the failure screen back to an editable form. Record, errors and
    /// draft are untouched, so a retry resubmits identical data.
    pub fn retry(&mut self) -> bool {
        if self.status == SubmissionStatus::ServerError {
            self.status = SubmissionStatus::Idle;
            true
        } else {
            false
        }
    }

    // --------------------------------------------------
    // Draft plumbing
    // --------------------------------------------------

    /// Periodic pump for the debounced draft writer. The presentation layer
    /// calls this from its frame loop.
    pub fn tick(&mut self) {
        if self.status != SubmissionStatus::Idle {
            return;
        }

        if let Err(e) = self.draft.tick(&self.record) {
            self.events.record("draft_write_failed", "tick", &e.to_string());
        }
    }

    /// Force the draft out immediately (e.g. before the window closes).
    pub fn flush_draft(&mut self) {
        if self.status != SubmissionStatus::Idle {
            return;
        }

        if let Err(e) = self.draft.flush(&self.record) {
            self.events
                .record("draft_write_failed", "flush", &e.to_string());
        }
    }

    fn after_change(&mut self) {
        if self.status == SubmissionStatus::Idle {
            self.draft.note_change();
        }
    }

    fn trim_field(&mut self, field: FieldId) {
        let slot = match field {
            FieldId::FullName => &mut self.record.full_name,
            FieldId::BirthPlace => &mut self.record.birth_place,
            FieldId::BirthDate => &mut self.record.birth_date,
            FieldId::Address => &mut self.record.address,
            FieldId::PreviousSchool => &mut self.record.previous_school,
            FieldId::Nisn => &mut self.record.nisn,
            FieldId::FatherName => &mut self.record.father_name,
            FieldId::FatherOccupationOther => &mut self.record.father_occupation_other,
            FieldId::MotherName => &mut self.record.mother_name,
            FieldId::MotherOccupationOther => &mut self.record.mother_occupation_other,
            FieldId::ParentWaNumber => &mut self.record.parent_wa_number,
            _ => return,
        };

        let trimmed = slot.trim();
        if trimmed.len() != slot.len() {
            *slot = trimmed.to_string();
            self.after_change();
        }
    }
}

fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

// ======================================================
// Unit Tests
// ======================================================
