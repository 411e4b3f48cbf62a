// src/context.rs

use std::path::PathBuf;

pub const APP_QUALIFIER: &str = "id";
pub const APP_ORG: &str = "smp-bhumi-ngasor";
pub const APP_ID: &str = "spmb-registration";

pub const SCHOOL_NAME: &str = "SMP Bhumi Ngasor Ar-Ridho";

/// Web-app endpoint of the spreadsheet collaborator.
pub const SHEET_ENDPOINT_URL: &str =
    "https://script.google.com/macros/s/AKfycbzTqhWhPUCt35a4NG0Zi_6vfAQcF0i1O0IRacxFCU8uRMhYLBQmlt3G6Wj8cDSLClgP/exec";

/// Admin number receiving the WhatsApp confirmation message.
pub const ADMIN_WA_NUMBER: &str = "6285731438560";

/// Local draft slot key. Versioned so a schema change can abandon old drafts.
pub const DRAFT_KEY: &str = "spmb_form_draft_v1";

#[derive(Debug, Clone)]
pub struct AppCtx {
    pub data_dir: PathBuf,
    pub endpoint_url: String,
}

impl AppCtx {
    pub fn new(data_dir: PathBuf) -> Self {
        let endpoint_url =
            std::env::var("SPMB_ENDPOINT_URL").unwrap_or_else(|_| SHEET_ENDPOINT_URL.to_string());

        Self {
            data_dir,
            endpoint_url,
        }
    }

    pub fn default_data_dir() -> Result<PathBuf, String> {
        if let Ok(p) = std::env::var("SPMB_DATA_DIR") {
            return Ok(PathBuf::from(p));
        }

        let proj = directories::ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_ID)
            .ok_or_else(|| "could not determine app data dir".to_string())?;
        Ok(proj.data_dir().to_path_buf())
    }
}

// ======================================================
// Unit Tests
// ======================================================
