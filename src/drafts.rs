//! Persisted form drafts, the on-disk analog of browser local storage. A single
//! JSON object maps fixed keys to blobs; the registration form keeps its
//! non-secret fields under [`REGISTRATION_FORM_KEY`] so an interrupted signup
//! can resume, and the draft is cleared once a submit succeeds.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fs, io,
    future::Future,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, warn};

pub const REGISTRATION_FORM_KEY: &str = "registrationForm";

const DRAFTS_FILE: &str = "drafts.json";

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("draft storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("draft encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Registration form fields that are safe to persist. Passwords are not part of
/// this type and therefore never reach disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub company_name: String,
    pub company_role: String,
    pub twitter_handle: String,
    pub discover_from: String,
}

impl Default for RegistrationDraft {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            username: String::new(),
            company_name: String::new(),
            company_role: String::new(),
            twitter_handle: String::new(),
            discover_from: "other".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    /// Drafts live in `drafts.json` inside `state_dir`.
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(DRAFTS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved draft, or the empty draft when nothing usable is stored.
    pub fn load_registration(&self) -> RegistrationDraft {
        let blob = match self.read_all() {
            Ok(mut blobs) => blobs.remove(REGISTRATION_FORM_KEY),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable draft storage");
                None
            }
        };

        blob.and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    /// Saves the draft, keeping other keys. A file that is not valid JSON is
    /// replaced.
    ///
    /// # Errors
    /// Returns `DraftError` if the drafts file cannot be read or written.
    pub fn save_registration(&self, draft: &RegistrationDraft) -> Result<(), DraftError> {
        let mut blobs = match self.read_all() {
            Ok(blobs) => blobs,
            Err(DraftError::Json(err)) => {
                warn!(error = %err, path = %self.path.display(), "replacing corrupt draft storage");
                Map::new()
            }
            Err(err) => return Err(err),
        };
        blobs.insert(REGISTRATION_FORM_KEY.to_string(), serde_json::to_value(draft)?);
        self.write_all(&blobs)
    }

    /// # Errors
    /// Returns `DraftError` if the drafts file cannot be read or written.
    pub fn clear_registration(&self) -> Result<(), DraftError> {
        let mut blobs = self.read_all()?;
        if blobs.remove(REGISTRATION_FORM_KEY).is_some() {
            self.write_all(&blobs)?;
        }
        Ok(())
    }

    /// Awaits a registration submit and clears the draft only when it succeeds.
    /// A failure to clear is logged; the submit result is returned unchanged.
    pub async fn submit_registration<T, E, F>(&self, submit: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let result = submit.await;
        if result.is_ok() {
            if let Err(err) = self.clear_registration() {
                warn!(error = %err, "failed to clear registration draft");
            }
        }
        result
    }

    fn read_all(&self) -> Result<Map<String, Value>, DraftError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(DraftError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_str(&contents)? {
            Value::Object(blobs) => Ok(blobs),
            _ => Ok(Map::new()),
        }
    }

    fn write_all(&self, blobs: &Map<String, Value>) -> Result<(), DraftError> {
        let io_err = |source: io::Error| DraftError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let encoded = serde_json::to_vec_pretty(blobs)?;
        fs::write(&self.path, encoded).map_err(io_err)?;
        debug!(path = %self.path.display(), "drafts saved");
        Ok(())
    }
}
