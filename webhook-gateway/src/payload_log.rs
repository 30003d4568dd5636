//! The payload logger (C5, spec §4.5): a rotating, per-service append-only
//! log of received webhook payloads.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
use tokio::sync::Mutex as AsyncMutex;

use crate::error::GatewayError;
use crate::models::PayloadLogRecord;

pub struct PayloadLogger {
    base_dir: PathBuf,
    max_bytes: u64,
    backup_count: u32,
    log_file_name: String,
    enabled: bool,
    /// One lock per service directory, so a write to `github`'s log never
    /// contends with a write to `stripe`'s.
    locks: DashMap<String, Arc<AsyncMutex<()>>>,
}

impl PayloadLogger {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        max_bytes: u64,
        backup_count: u32,
        log_file_name: impl Into<String>,
        enabled: bool,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            max_bytes,
            backup_count,
            log_file_name: log_file_name.into(),
            enabled,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, service: &str) -> Arc<AsyncMutex<()>> {
        self.locks
            .entry(service.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn service_dir(&self, service: &str) -> PathBuf {
        self.base_dir.join(service)
    }

    fn active_path(&self, service: &str) -> PathBuf {
        self.service_dir(service).join(&self.log_file_name)
    }

    fn rotated_path(&self, service: &str, n: u32) -> PathBuf {
        self.service_dir(service)
            .join(format!("{}.{}", self.log_file_name, n))
    }

    /// Append one record. Failures are non-fatal to the caller: they are
    /// logged and reported back as `Err`, but the webhook request that
    /// triggered the write must proceed regardless (spec §4.5).
    pub async fn append(&self, service: &str, record: &PayloadLogRecord) -> Result<(), GatewayError> {
        if !self.enabled {
            return Ok(());
        }
        let lock = self.lock_for(service);
        let _guard = lock.lock().await;

        let result = self.append_locked(service, record).await;
        if let Err(ref e) = result {
            tracing::error!(service, error = %e, "failed to write payload log");
        }
        result
    }

    async fn append_locked(&self, service: &str, record: &PayloadLogRecord) -> Result<(), GatewayError> {
        let dir = self.service_dir(service);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| GatewayError::LogIoFailure(e.to_string()))?;

        let active = self.active_path(service);
        let mut line = serde_json::to_string(record).map_err(|e| GatewayError::LogIoFailure(e.to_string()))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&active)
            .await
            .map_err(|e| GatewayError::LogIoFailure(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| GatewayError::LogIoFailure(e.to_string()))?;
        file.flush().await.map_err(|e| GatewayError::LogIoFailure(e.to_string()))?;
        drop(file);

        let size = tokio::fs::metadata(&active)
            .await
            .map_err(|e| GatewayError::LogIoFailure(e.to_string()))?
            .len();
        if size >= self.max_bytes {
            self.rotate(service).await?;
        }
        Ok(())
    }

    async fn rotate(&self, service: &str) -> Result<(), GatewayError> {
        for n in (1..=self.backup_count).rev() {
            let src = self.rotated_path(service, n);
            if tokio::fs::metadata(&src).await.is_err() {
                continue;
            }
            if n == self.backup_count {
                let _ = tokio::fs::remove_file(&src).await;
            } else {
                let dst = self.rotated_path(service, n + 1);
                tokio::fs::rename(&src, &dst)
                    .await
                    .map_err(|e| GatewayError::LogIoFailure(e.to_string()))?;
            }
        }
        if self.backup_count > 0 {
            tokio::fs::rename(self.active_path(service), self.rotated_path(service, 1))
                .await
                .map_err(|e| GatewayError::LogIoFailure(e.to_string()))?;
            tokio::fs::File::create(self.active_path(service))
                .await
                .map_err(|e| GatewayError::LogIoFailure(e.to_string()))?;
        }
        Ok(())
    }

    /// Return the last `limit` entries across the active file and its
    /// rotated siblings, newest first.
    pub async fn recent(&self, service: &str, limit: usize) -> Result<Vec<PayloadLogRecord>, GatewayError> {
        let mut out = Vec::new();
        let mut candidates = vec![self.active_path(service)];
        for n in 1..=self.backup_count {
            candidates.push(self.rotated_path(service, n));
        }

        for path in candidates {
            if out.len() >= limit {
                break;
            }
            let Ok(file) = tokio::fs::File::open(&path).await else {
                continue;
            };
            let reader = tokio::io::BufReader::new(file);
            let mut lines = reader.lines();
            let mut buffered = Vec::new();
            while let Some(line) = lines
                .next_line()
                .await
                .map_err(|e| GatewayError::LogIoFailure(e.to_string()))?
            {
                if let Ok(record) = serde_json::from_str::<PayloadLogRecord>(&line) {
                    buffered.push(record);
                }
            }
            out.extend(buffered.into_iter().rev());
        }
        out.truncate(limit);
        Ok(out)
    }

    /// List services that have a log directory (spec C8: `GET
    /// /api/webhook-logs/types`).
    pub async fn list_service_types(&self) -> Result<Vec<String>, GatewayError> {
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(GatewayError::LogIoFailure(e.to_string())),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| GatewayError::LogIoFailure(e.to_string()))?
        {
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Remove a service's payload-log directory entirely (cascade delete
    /// driven by the config store when the last record for a service is
    /// removed).
    pub async fn remove_service_dir(&self, service: &str) -> Result<(), GatewayError> {
        match tokio::fs::remove_dir_all(self.service_dir(service)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GatewayError::LogIoFailure(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessingStatus;

    fn sample_record(n: usize) -> PayloadLogRecord {
        PayloadLogRecord {
            timestamp: chrono::DateTime::UNIX_EPOCH + chrono::Duration::seconds(n as i64),
            webhook_type: "github".into(),
            payload: serde_json::json!({"n": n}),
            source_ip: None,
            user_agent: None,
            processing_status: ProcessingStatus::Success,
            generated_message: None,
            content_length: None,
        }
    }

    #[tokio::test]
    async fn append_then_recent_returns_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let logger = PayloadLogger::new(dir.path(), 10 * 1024 * 1024, 5, "payload.log", true);
        for i in 0..3 {
            logger.append("github", &sample_record(i)).await.unwrap();
        }
        let recent = logger.recent("github", 10).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].payload["n"], 2);
        assert_eq!(recent[2].payload["n"], 0);
    }

    #[tokio::test]
    async fn rotation_triggers_past_threshold_and_opens_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        // Tiny threshold: every append exceeds it, so each call rotates.
        let logger = PayloadLogger::new(dir.path(), 1, 2, "payload.log", true);
        logger.append("github", &sample_record(0)).await.unwrap();
        logger.append("github", &sample_record(1)).await.unwrap();

        let active = dir.path().join("github").join("payload.log");
        let rotated_1 = dir.path().join("github").join("payload.log.1");
        assert!(active.exists());
        assert!(rotated_1.exists());
    }

    #[tokio::test]
    async fn disabled_logger_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let logger = PayloadLogger::new(dir.path(), 10 * 1024 * 1024, 5, "payload.log", false);
        logger.append("github", &sample_record(0)).await.unwrap();
        assert!(!dir.path().join("github").exists());
    }

    #[tokio::test]
    async fn deleting_last_record_removes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let logger = PayloadLogger::new(dir.path(), 10 * 1024 * 1024, 5, "payload.log", true);
        logger.append("github", &sample_record(0)).await.unwrap();
        assert!(dir.path().join("github").exists());
        logger.remove_service_dir("github").await.unwrap();
        assert!(!dir.path().join("github").exists());
    }
}
