//! Directory-backed Guide Store
//!
//! Each guide is a pretty-printed JSON document named after its topic id:
//!
//! ```text
//! <dir>/
//!   paging.json
//!   round-robin.json
//!   c%2B%2B-templates.json     (topic id "c++-templates")
//! ```
//!
//! Topic ids are percent-encoded into file names, so distinct ids map to
//! distinct names. On a case-insensitive filesystem ids differing only in
//! case (`Paging`, `paging`) still share a file.
//!
//! Every write goes to its own temporary file and is renamed into place, so a
//! reader never sees a half-written guide and overlapping writes for the same
//! topic both succeed (the last rename wins).

use crate::db::error::GuideStoreError;
use crate::db::guide_store::GuideStore;
use crate::models::StoredGuide;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

const GUIDE_EXTENSION: &str = "json";

/// Distinguishes temporary files of concurrent writes within this process
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct JsonDirGuideStore {
    dir: PathBuf,
}

impl JsonDirGuideStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, GuideStoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| GuideStoreError::io(&dir, e))?;
        tracing::debug!("Guide store opened at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn guide_path(&self, topic_id: &str) -> Result<PathBuf, GuideStoreError> {
        if topic_id.trim().is_empty() {
            return Err(GuideStoreError::invalid_key(topic_id));
        }
        Ok(self
            .dir
            .join(format!("{}.{}", encode_key(topic_id), GUIDE_EXTENSION)))
    }
}

#[async_trait]
impl GuideStore for JsonDirGuideStore {
    async fn get(&self, topic_id: &str) -> Result<Option<StoredGuide>, GuideStoreError> {
        let path = self.guide_path(topic_id)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(GuideStoreError::io(path, e)),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn put(&self, guide: StoredGuide) -> Result<(), GuideStoreError> {
        let path = self.guide_path(&guide.topic_id)?;
        let tmp_path = path.with_extension(format!(
            "{}.{}-{}.tmp",
            GUIDE_EXTENSION,
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let body = serde_json::to_string_pretty(&guide)?;

        if let Err(e) = tokio::fs::write(&tmp_path, body).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(GuideStoreError::io(&tmp_path, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(GuideStoreError::io(&path, e));
        }

        tracing::debug!("Stored guide for topic '{}'", guide.topic_id);
        Ok(())
    }

    async fn delete(&self, topic_id: &str) -> Result<bool, GuideStoreError> {
        let path = self.guide_path(topic_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(GuideStoreError::io(path, e)),
        }
    }

    async fn list_topic_ids(&self) -> Result<Vec<String>, GuideStoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| GuideStoreError::io(&self.dir, e))?;

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| GuideStoreError::io(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(GUIDE_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match decode_key(stem) {
                Some(id) => ids.push(id),
                None => tracing::warn!("Ignoring unrecognised guide file {}", path.display()),
            }
        }

        ids.sort();
        Ok(ids)
    }
}

/// Percent-encode every byte outside `[A-Za-z0-9_-]`
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

fn decode_key(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}
