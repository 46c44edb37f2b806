//! 持久化会话快照

use serde::{Deserialize, Serialize};

use crate::models::Role;

/// 持久化的两段文本（对应存储键 `extractedText`）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTexts {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub student: String,
}

impl StoredTexts {
    pub fn set(&mut self, role: Role, text: String) {
        match role {
            Role::Model => self.model = text,
            Role::Student => self.student = text,
        }
    }
}

/// `restore()` 的结果：标记位 + 两段文本（可能缺失）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub has_processed_data: bool,
    pub model_text: Option<String>,
    pub student_text: Option<String>,
    /// 最近一次完整提交的时间（RFC 3339）
    pub processed_at: Option<String>,
}

impl SessionSnapshot {
    pub fn text(&self, role: Role) -> Option<&str> {
        match role {
            Role::Model => self.model_text.as_deref(),
            Role::Student => self.student_text.as_deref(),
        }
    }

    /// 两段文本都存在且非空
    pub fn has_both_texts(&self) -> bool {
        Role::ALL
            .iter()
            .all(|r| self.text(*r).is_some_and(|t| !t.trim().is_empty()))
    }

    /// 标记位为 true 时两段文本必须都非空
    pub fn is_consistent(&self) -> bool {
        !self.has_processed_data || self.has_both_texts()
    }

    /// 没有任何持久化内容
    pub fn is_empty(&self) -> bool {
        !self.has_processed_data && self.model_text.is_none() && self.student_text.is_none()
    }
}
