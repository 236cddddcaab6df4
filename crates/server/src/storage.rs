//! Receipt object storage.
//!
//! Uploads happen before submission; a draft row then carries the returned
//! URL. Deletion of superseded or orphaned objects is best-effort and runs
//! in the background: a failed delete costs disk space, never a request.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use api_types::receipt::{ReceiptUpload, ReceiptUploaded};
use axum::{
    Extension, Json, body::Bytes,
    extract::{Query, State},
};
use rand::Rng;

use crate::{ServerError, server::ServerState};
use engine::Session;

pub trait ReceiptStore: Send + Sync {
    /// Stores the object and returns its public URL.
    fn put(&self, key: &str, bytes: &[u8]) -> io::Result<String>;
    fn url_for(&self, key: &str) -> String;
    /// Inverse of [`ReceiptStore::url_for`]; `None` for foreign URLs.
    fn key_for(&self, url: &str) -> Option<String>;
    fn remove(&self, keys: &[String]) -> io::Result<()>;
}

/// Filesystem-backed store; keys map directly to paths under `root`.
pub struct FsReceiptStore {
    root: PathBuf,
    base_url: String,
}

impl FsReceiptStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            root: root.into(),
            base_url,
        }
    }

    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        // Keys are generated server-side, but never let a stored URL walk
        // out of the root.
        if key.split('/').any(|part| part == ".." || part.is_empty()) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "bad key"));
        }
        Ok(self.root.join(key))
    }
}

impl ReceiptStore for FsReceiptStore {
    fn put(&self, key: &str, bytes: &[u8]) -> io::Result<String> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        Ok(self.url_for(key))
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{key}", self.base_url)
    }

    fn key_for(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(ToString::to_string)
    }

    fn remove(&self, keys: &[String]) -> io::Result<()> {
        for key in keys {
            std::fs::remove_file(self.path_for(key)?)?;
        }
        Ok(())
    }
}

/// Collision-resistant key: `{user}/{unix_millis}-{rand}.{ext}`.
fn make_key(session: &Session, filename: &str) -> String {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    let millis = chrono::Utc::now().timestamp_millis();
    let nonce: u32 = rand::rng().random();
    format!("{}/{millis}-{nonce:08x}.{ext}", session.user_id)
}

/// Fire-and-forget removal of a superseded or orphaned receipt.
pub(crate) fn cleanup_receipt(store: Arc<dyn ReceiptStore>, url: String) {
    tokio::spawn(async move {
        let Some(key) = store.key_for(&url) else {
            tracing::warn!(%url, "skipping cleanup of foreign receipt url");
            return;
        };
        if let Err(err) = store.remove(std::slice::from_ref(&key)) {
            tracing::warn!(%key, "failed to remove superseded receipt: {err}");
        }
    });
}

/// Handle receipt uploads (raw bytes body).
///
/// When `replaces` names a previous upload, the old object is deleted in the
/// background once the new one is stored.
pub async fn upload(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(query): Query<ReceiptUpload>,
    body: Bytes,
) -> Result<Json<ReceiptUploaded>, ServerError> {
    if body.is_empty() {
        return Err(ServerError::Generic("empty upload".to_string()));
    }

    let key = make_key(&session, &query.filename);
    let url = state
        .store
        .put(&key, &body)
        .map_err(|err| ServerError::Generic(format!("upload failed: {err}")))?;

    if let Some(old) = query.replaces {
        cleanup_receipt(state.store.clone(), old);
    }

    Ok(Json(ReceiptUploaded { url }))
}
