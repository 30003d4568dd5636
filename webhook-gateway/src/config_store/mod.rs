//! The configuration store (C3, spec §4.3): load, parse, validate,
//! atomically rewrite, and back up the webhook configuration file.

mod format;

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex as AsyncMutex;

use crate::error::GatewayError;
use crate::extract;
use crate::models::{Alignment, ConfigRecord};
use crate::template;

pub use format::LEGACY_TOKEN;

/// Owns the on-disk webhook configuration file. Reads are always a fresh
/// parse of the current file (spec §4.3: "re-read from disk on every
/// `resolve` call"); writes are serialised through `write_lock` and applied
/// via tempfile-then-atomic-rename, with a timestamped backup taken first.
pub struct ConfigStore {
    path: PathBuf,
    backup_dir: PathBuf,
    write_lock: AsyncMutex<()>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_dir: backup_dir.into(),
            write_lock: AsyncMutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Vec<ConfigRecord>, GatewayError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(GatewayError::BadConfig(format!("cannot read store: {e}"))),
        };
        format::parse(&contents)
    }

    /// `resolve(service, token)` — return the full record or `NotFound`.
    pub async fn resolve(&self, service: &str, token: &str) -> Result<ConfigRecord, GatewayError> {
        let records = self.read_all().await?;
        records
            .into_iter()
            .find(|r| r.service == service && r.token == token)
            .ok_or(GatewayError::NotFound)
    }

    /// `list()` — return all records in a deterministic order.
    pub async fn list(&self) -> Result<Vec<ConfigRecord>, GatewayError> {
        let mut records = self.read_all().await?;
        records.sort_by(|a, b| a.service.cmp(&b.service).then(a.token.cmp(&b.token)));
        Ok(records)
    }

    /// Whether `token` is already bound to any record, used by the token
    /// mint (C4) to check for collisions.
    pub async fn contains_token(&self, token: &str) -> Result<bool, GatewayError> {
        let records = self.read_all().await?;
        Ok(records.iter().any(|r| r.token == token))
    }

    /// `create(record)` — insert a freshly-minted record.
    pub async fn create(
        &self,
        service: String,
        token: String,
        fields: String,
        template: String,
        alignment: Alignment,
    ) -> Result<ConfigRecord, GatewayError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        let record = ConfigRecord {
            service,
            token,
            alignment: alignment.into(),
            fields,
            template,
        };
        validate_record(&record, &records)?;
        records.push(record.clone());
        self.rewrite(&records).await?;
        Ok(record)
    }

    /// `update(service, token, fields, template, alignment)` — replace the
    /// mutable parts while preserving the token.
    pub async fn update(
        &self,
        service: &str,
        token: &str,
        fields: String,
        template: String,
        alignment: Alignment,
    ) -> Result<ConfigRecord, GatewayError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        let index = records
            .iter()
            .position(|r| r.service == service && r.token == token)
            .ok_or(GatewayError::NotFound)?;

        let updated = ConfigRecord {
            service: service.to_string(),
            token: token.to_string(),
            alignment: alignment.into(),
            fields,
            template,
        };
        let rest: Vec<&ConfigRecord> = records
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, r)| r)
            .collect();
        validate_against(&updated, rest.into_iter())?;
        records[index] = updated.clone();
        self.rewrite(&records).await?;
        Ok(updated)
    }

    /// `delete(service, token)` — remove a record. Returns whether this
    /// was the last remaining record for `service`.
    pub async fn delete(&self, service: &str, token: &str) -> Result<bool, GatewayError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        let index = records
            .iter()
            .position(|r| r.service == service && r.token == token)
            .ok_or(GatewayError::NotFound)?;
        records.remove(index);
        let was_last = !records.iter().any(|r| r.service == service);
        self.rewrite(&records).await?;
        Ok(was_last)
    }

    /// Render, back up, and atomically replace the store file.
    async fn rewrite(&self, records: &[ConfigRecord]) -> Result<(), GatewayError> {
        self.backup_current().await?;

        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| GatewayError::BadConfig(format!("cannot create store dir: {e}")))?;

        let rendered = format::serialise(records);
        let tmp_path = dir.join(format!(
            ".{}.tmp",
            self.path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("webhooks")
        ));
        tokio::fs::write(&tmp_path, rendered)
            .await
            .map_err(|e| GatewayError::BadConfig(format!("cannot write temp store file: {e}")))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| GatewayError::BadConfig(format!("cannot replace store file: {e}")))?;
        Ok(())
    }

    async fn backup_current(&self) -> Result<(), GatewayError> {
        let Ok(contents) = tokio::fs::read(&self.path).await else {
            return Ok(());
        };
        tokio::fs::create_dir_all(&self.backup_dir)
            .await
            .map_err(|e| GatewayError::BadConfig(format!("cannot create backup dir: {e}")))?;
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let backup_path = self.backup_dir.join(format!("webhooks-{stamp}.bak"));
        tokio::fs::write(&backup_path, contents)
            .await
            .map_err(|e| GatewayError::BadConfig(format!("cannot write backup: {e}")))?;
        Ok(())
    }
}

/// Validation rules applied on write (spec §4.3): unique token, service
/// charset, parseable fields/template, well-formed alignment.
fn validate_record(record: &ConfigRecord, existing: &[ConfigRecord]) -> Result<(), GatewayError> {
    validate_against(record, existing.iter())
}

fn validate_against<'a>(
    record: &ConfigRecord,
    existing: impl Iterator<Item = &'a ConfigRecord>,
) -> Result<(), GatewayError> {
    if !is_valid_service_name(&record.service) {
        return Err(GatewayError::BadConfig(format!(
            "invalid service name: {}",
            record.service
        )));
    }
    extract::parse_fields(&record.fields)?;
    template::validate(&record.template)?;

    for other in existing {
        if other.token == record.token {
            return Err(GatewayError::TokenCollision);
        }
    }
    Ok(())
}

fn is_valid_service_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
