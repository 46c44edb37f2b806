//! 会话持久化服务 - 业务能力层
//!
//! 只负责"记住上一次抽取结果"能力：一个标记位 + 两段文本。
//! 与内存中的文件句柄无关，重启后仍然可以恢复。
//!
//! 存储键：
//! - `hasProcessedData`：`"true"` 表示已完成一次完整抽取
//! - `extractedText`：`{"model": "...", "student": "..."}`
//! - `processedAt`：完成时间（RFC 3339）

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{AppResult, StorageError};
use crate::models::{Role, SessionSnapshot, StoredTexts};

pub const KEY_HAS_PROCESSED_DATA: &str = "hasProcessedData";
pub const KEY_EXTRACTED_TEXT: &str = "extractedText";
pub const KEY_PROCESSED_AT: &str = "processedAt";

type Entries = BTreeMap<String, String>;

/// 持久化键值存储
///
/// 每次读写都是整份文档，保证"同时读到两段文本"和"一次清空所有键"
pub trait KeyValueStorage: Send + Sync {
    fn load(&self) -> BoxFuture<'_, Result<Entries, StorageError>>;
    fn save<'a>(&'a self, entries: &'a Entries) -> BoxFuture<'a, Result<(), StorageError>>;
}

/// 磁盘 JSON 文件存储（临时文件 + rename 原子替换）
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_entries(&self) -> Result<Entries, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(source) => {
                return Err(StorageError::ReadFailed {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content).map_err(|source| StorageError::Corrupted {
            path: self.path.display().to_string(),
            source,
        })
    }

    async fn write_entries(&self, entries: &Entries) -> Result<(), StorageError> {
        let write_failed = |source| StorageError::WriteFailed {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
        }

        let content = serde_json::to_string_pretty(entries).map_err(|source| {
            StorageError::Corrupted {
                path: self.path.display().to_string(),
                source,
            }
        })?;

        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(write_failed)?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(write_failed)?;

        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn load(&self) -> BoxFuture<'_, Result<Entries, StorageError>> {
        self.read_entries().boxed()
    }

    fn save<'a>(&'a self, entries: &'a Entries) -> BoxFuture<'a, Result<(), StorageError>> {
        self.write_entries(entries).boxed()
    }
}

/// 内存存储（测试 / 临时会话）
#[derive(Default)]
pub struct MemoryStorage {
    entries: std::sync::Mutex<Entries>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入原始键值（用于模拟损坏的存储）
    pub fn with_entries(entries: Entries) -> Self {
        Self {
            entries: std::sync::Mutex::new(entries),
        }
    }

    fn snapshot(&self) -> Entries {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, entries: &Entries) {
        match self.entries.lock() {
            Ok(mut guard) => *guard = entries.clone(),
            Err(poisoned) => *poisoned.into_inner() = entries.clone(),
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn load(&self) -> BoxFuture<'_, Result<Entries, StorageError>> {
        let entries = self.snapshot();
        async move { Ok(entries) }.boxed()
    }

    fn save<'a>(&'a self, entries: &'a Entries) -> BoxFuture<'a, Result<(), StorageError>> {
        self.replace(entries);
        async { Ok(()) }.boxed()
    }
}

/// 会话代次
///
/// 每次 reset 后递增；在途请求拿着旧代次回来时，结果不再写入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken(u64);

/// 会话持久化服务
///
/// 可克隆的共享句柄，所有读改写都在同一把锁内完成
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    generation: Arc<Mutex<u64>>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            generation: Arc::new(Mutex::new(0)),
        }
    }

    /// 磁盘文件存储
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStorage::new(path)))
    }

    /// 内存存储
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// 当前会话代次
    pub async fn token(&self) -> SessionToken {
        SessionToken(*self.generation.lock().await)
    }

    /// 读取持久化内容
    pub async fn restore(&self) -> AppResult<SessionSnapshot> {
        let _guard = self.generation.lock().await;
        let entries = self.storage.load().await?;
        Ok(snapshot_from(&entries))
    }

    /// 写入单个角色的文本（部分成功时保留已得到的结果）
    ///
    /// 新的一轮抽取开始后，旧的完成标记不再成立，一并清除
    pub async fn store_text(&self, role: Role, text: &str) -> AppResult<()> {
        let _guard = self.generation.lock().await;
        self.write_text(role, text).await
    }

    /// 同 `store_text`，但会话已被重置时放弃写入，返回 false
    pub async fn store_text_if_current(
        &self,
        token: SessionToken,
        role: Role,
        text: &str,
    ) -> AppResult<bool> {
        let guard = self.generation.lock().await;
        if *guard != token.0 {
            debug!("会话已重置，丢弃 {} 文本", role);
            return Ok(false);
        }
        self.write_text(role, text).await?;
        Ok(true)
    }

    /// 写入两段文本并置位完成标记
    pub async fn commit(&self, model: &str, student: &str) -> AppResult<()> {
        let _guard = self.generation.lock().await;
        self.write_commit(model, student).await
    }

    /// 同 `commit`，但会话已被重置时放弃写入，返回 false
    pub async fn commit_if_current(
        &self,
        token: SessionToken,
        model: &str,
        student: &str,
    ) -> AppResult<bool> {
        let guard = self.generation.lock().await;
        if *guard != token.0 {
            debug!("会话已重置，丢弃提交");
            return Ok(false);
        }
        self.write_commit(model, student).await?;
        Ok(true)
    }

    /// 一次性删除所有键，可重复调用
    pub async fn reset(&self) -> AppResult<()> {
        let mut guard = self.generation.lock().await;
        self.storage.save(&Entries::new()).await?;
        *guard += 1;
        info!("🧹 会话已清空");
        Ok(())
    }

    async fn write_text(&self, role: Role, text: &str) -> AppResult<()> {
        let mut entries = self.storage.load().await?;
        let mut texts = texts_from(&entries);
        texts.set(role, text.to_string());

        entries.remove(KEY_HAS_PROCESSED_DATA);
        entries.remove(KEY_PROCESSED_AT);
        entries.insert(KEY_EXTRACTED_TEXT.to_string(), serde_json::to_string(&texts)?);

        self.storage.save(&entries).await?;
        debug!("已保存 {} 文本 ({} 字符)", role, text.len());
        Ok(())
    }

    async fn write_commit(&self, model: &str, student: &str) -> AppResult<()> {
        for (role, text) in [(Role::Model, model), (Role::Student, student)] {
            if text.trim().is_empty() {
                return Err(StorageError::EmptyText { role }.into());
            }
        }

        let texts = StoredTexts {
            model: model.to_string(),
            student: student.to_string(),
        };

        let mut entries = Entries::new();
        entries.insert(KEY_EXTRACTED_TEXT.to_string(), serde_json::to_string(&texts)?);
        entries.insert(KEY_HAS_PROCESSED_DATA.to_string(), "true".to_string());
        entries.insert(KEY_PROCESSED_AT.to_string(), chrono::Local::now().to_rfc3339());

        self.storage.save(&entries).await?;
        info!("💾 抽取结果已保存，会话标记已置位");
        Ok(())
    }
}

fn texts_from(entries: &Entries) -> StoredTexts {
    match entries.get(KEY_EXTRACTED_TEXT) {
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
            warn!("⚠️ extractedText 无法解析，按缺失处理: {}", e);
            StoredTexts::default()
        }),
        None => StoredTexts::default(),
    }
}

fn snapshot_from(entries: &Entries) -> SessionSnapshot {
    let texts = texts_from(entries);
    let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };

    SessionSnapshot {
        has_processed_data: entries
            .get(KEY_HAS_PROCESSED_DATA)
            .is_some_and(|v| v == "true"),
        model_text: non_empty(texts.model),
        student_text: non_empty(texts.student),
        processed_at: entries.get(KEY_PROCESSED_AT).cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commit_then_restore() {
        let store = SessionStore::in_memory();
        store.commit("model answer", "student answer").await.unwrap();

        let snap = store.restore().await.unwrap();
        assert!(snap.has_processed_data);
        assert_eq!(snap.model_text.as_deref(), Some("model answer"));
        assert_eq!(snap.student_text.as_deref(), Some("student answer"));
        assert!(snap.processed_at.is_some());
        assert!(snap.is_consistent());
    }

    #[tokio::test]
    async fn test_commit_rejects_empty_text() {
        let store = SessionStore::in_memory();
        let err = store.commit("model answer", "  ").await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Storage(StorageError::EmptyText { role: Role::Student })
        ));

        let snap = store.restore().await.unwrap();
        assert!(!snap.has_processed_data);
    }

    #[tokio::test]
    async fn test_store_text_clears_flag() {
        let store = SessionStore::in_memory();
        store.commit("old model", "old student").await.unwrap();
        store.store_text(Role::Model, "new model").await.unwrap();

        let snap = store.restore().await.unwrap();
        assert!(!snap.has_processed_data);
        assert_eq!(snap.model_text.as_deref(), Some("new model"));
        assert_eq!(snap.student_text.as_deref(), Some("old student"));
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let store = SessionStore::in_memory();
        store.commit("m", "s").await.unwrap();

        store.reset().await.unwrap();
        let once = store.restore().await.unwrap();
        store.reset().await.unwrap();
        let twice = store.restore().await.unwrap();

        assert!(once.is_empty());
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_stale_token_is_dropped() {
        let store = SessionStore::in_memory();
        let token = store.token().await;
        store.reset().await.unwrap();

        let applied = store
            .store_text_if_current(token, Role::Model, "late result")
            .await
            .unwrap();
        assert!(!applied);
        assert!(store.restore().await.unwrap().is_empty());

        let fresh = store.token().await;
        assert!(store.commit_if_current(fresh, "m", "s").await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_flag_without_texts() {
        let mut entries = Entries::new();
        entries.insert(KEY_HAS_PROCESSED_DATA.to_string(), "true".to_string());
        entries.insert(KEY_EXTRACTED_TEXT.to_string(), "{not json".to_string());
        let store = SessionStore::new(Arc::new(MemoryStorage::with_entries(entries)));

        let snap = store.restore().await.unwrap();
        assert!(snap.has_processed_data);
        assert!(!snap.is_consistent());
    }

    #[tokio::test]
    async fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        SessionStore::open(&path)
            .commit("model text", "student text")
            .await
            .unwrap();

        // 模拟重启：新的句柄读取同一个文件
        let reopened = SessionStore::open(&path).restore().await.unwrap();
        assert!(reopened.has_processed_data);
        assert_eq!(reopened.student_text.as_deref(), Some("student text"));
    }

    #[tokio::test]
    async fn test_file_storage_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "][").await.unwrap();

        let err = SessionStore::open(&path).restore().await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Storage(StorageError::Corrupted { .. })
        ));
    }
}
