//! 文件槽服务 - 业务能力层
//!
//! 每个角色最多持有一个文件；新文件直接替换旧文件

use tracing::{info, warn};

use crate::error::{AppResult, ValidationError};
use crate::models::{format_file_size, Role, UploadFile};
use crate::services::SessionStore;

/// 文件槽
///
/// 职责：
/// - 校验并保存上传的文件
/// - 单独清空某一侧
/// - 整体重置（连同持久化的会话）
#[derive(Debug, Default)]
pub struct FileSlotStore {
    model: Option<UploadFile>,
    student: Option<UploadFile>,
}

impl FileSlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 校验通过后放入对应的槽；校验失败不修改任何状态
    pub fn set_file(&mut self, role: Role, file: UploadFile) -> Result<(), ValidationError> {
        if let Err(e) = file.validate() {
            warn!("⚠️ {} 文件 {} 校验失败: {:?}", role, file.name, e);
            return Err(e);
        }

        info!(
            "📎 {} 文件: {} ({})",
            role,
            file.name,
            format_file_size(file.size())
        );

        let slot = self.slot_mut(role);
        if let Some(old) = slot.replace(file) {
            info!("替换了原有的 {} 文件 {}", role, old.name);
        }
        Ok(())
    }

    /// 清空某一侧，不影响另一侧
    pub fn clear_file(&mut self, role: Role) {
        *self.slot_mut(role) = None;
    }

    /// 清空两个槽，并删除持久化的标记和文本
    ///
    /// 先清持久化；失败时文件槽保持原样
    pub async fn clear_session(&mut self, session: &SessionStore) -> AppResult<()> {
        session.reset().await?;
        self.model = None;
        self.student = None;
        Ok(())
    }

    pub fn file(&self, role: Role) -> Option<&UploadFile> {
        match role {
            Role::Model => self.model.as_ref(),
            Role::Student => self.student.as_ref(),
        }
    }

    /// 两个文件都已上传时返回二者
    pub fn both(&self) -> Option<(&UploadFile, &UploadFile)> {
        Some((self.model.as_ref()?, self.student.as_ref()?))
    }

    /// 第一个缺失的角色
    pub fn missing(&self) -> Option<Role> {
        Role::ALL.into_iter().find(|r| self.file(*r).is_none())
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.student.is_none()
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<UploadFile> {
        match role {
            Role::Model => &mut self.model,
            Role::Student => &mut self.student,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_FILE_SIZE;

    fn pdf(name: &str) -> UploadFile {
        UploadFile::new(name, Some("application/pdf".to_string()), b"%PDF-1.4".to_vec())
    }

    #[test]
    fn test_set_file_replaces() {
        let mut store = FileSlotStore::new();
        tokio_test::assert_ok!(store.set_file(Role::Model, pdf("first.pdf")));
        tokio_test::assert_ok!(store.set_file(Role::Model, pdf("second.pdf")));

        assert_eq!(store.file(Role::Model).unwrap().name, "second.pdf");
        assert!(store.file(Role::Student).is_none());
        assert_eq!(store.missing(), Some(Role::Student));
    }

    #[test]
    fn test_rejected_file_leaves_store_unchanged() {
        let mut store = FileSlotStore::new();
        store.set_file(Role::Student, pdf("keep.pdf")).unwrap();

        let bad = UploadFile::new("notes.exe", None, vec![1, 2, 3]);
        assert!(store.set_file(Role::Student, bad).is_err());

        let huge = UploadFile::new("big.pdf", None, vec![0; MAX_FILE_SIZE as usize + 1]);
        assert!(store.set_file(Role::Student, huge).is_err());

        assert_eq!(store.file(Role::Student).unwrap().name, "keep.pdf");
    }

    #[test]
    fn test_clear_file_is_independent() {
        let mut store = FileSlotStore::new();
        store.set_file(Role::Model, pdf("m.pdf")).unwrap();
        store.set_file(Role::Student, pdf("s.pdf")).unwrap();
        assert!(store.both().is_some());

        store.clear_file(Role::Model);
        assert!(store.file(Role::Model).is_none());
        assert!(store.file(Role::Student).is_some());
        assert!(store.both().is_none());
    }

    #[tokio::test]
    async fn test_clear_session_twice() {
        let session = SessionStore::in_memory();
        session.commit("m", "s").await.unwrap();

        let mut store = FileSlotStore::new();
        store.set_file(Role::Model, pdf("m.pdf")).unwrap();

        store.clear_session(&session).await.unwrap();
        let once = session.restore().await.unwrap();
        store.clear_session(&session).await.unwrap();
        let twice = session.restore().await.unwrap();

        assert!(store.is_empty());
        assert!(once.is_empty());
        assert_eq!(once, twice);
    }
}
