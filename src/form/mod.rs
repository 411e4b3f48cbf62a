// src/form/mod.rs

pub mod controller;
pub mod nav;
pub mod schema;
pub mod test_support;

pub use controller::FormSession;
pub use schema::{
    step_fields, validate_all, validate_field, validate_slot_candidate, validate_step,
    SchemaVersion,
};
