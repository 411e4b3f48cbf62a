// src/lib.rs

pub mod confirm;
pub mod context;
pub mod draft;
pub mod encode;
pub mod error;
pub mod event_log;
pub mod form;
pub mod submit;
pub mod types;

use crate::context::AppCtx;
use crate::draft::{DraftSaver, FsDraftStore};
use crate::event_log::EventLog;
use crate::form::controller::FormSession;
use crate::form::schema::SchemaVersion;
use crate::submit::{SheetTransport, SubmitOptions};

/// Build a ready-to-drive session for the live form: filesystem draft store,
/// spreadsheet transport, survey schema.
pub fn init_session(ctx: &AppCtx) -> Result<FormSession<FsDraftStore, SheetTransport>, String> {
    std::fs::create_dir_all(&ctx.data_dir)
        .map_err(|e| format!("failed to create app data dir: {e}"))?;

    let events = EventLog::init(&ctx.data_dir)?;
    let transport = SheetTransport::new(ctx.endpoint_url.clone()).map_err(|e| e.to_string())?;
    let draft = DraftSaver::new(FsDraftStore::new(ctx.data_dir.clone()));

    Ok(FormSession::new(
        SchemaVersion::Survey,
        draft,
        transport,
        events,
        SubmitOptions::default(),
    ))
}
