//! 上传文件模型
//!
//! 描述"哪一份答卷"（Role）以及上传的二进制文件本身

use std::fmt::Display;
use std::path::Path;

use anyhow::{Context, Result};
use phf::phf_set;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;

use crate::error::ValidationError;

/// 单个文件大小上限：10 MiB（包含边界）
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// 类型识别所需的文件头长度
const HEADER_LEN: usize = 8 * 1024;

/// 允许的 MIME 类型
static ALLOWED_MIME_TYPES: phf::Set<&'static str> = phf_set! {
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
    "image/bmp",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
    "text/plain",
};

/// 允许的扩展名（小写，不带点）
static ALLOWED_EXTENSIONS: phf::Set<&'static str> = phf_set! {
    "pdf", "png", "jpg", "jpeg", "gif", "bmp", "docx", "doc", "txt",
};

/// 答卷角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 参考答案
    Model,
    /// 学生答卷
    Student,
}

impl Role {
    /// 两个角色，按处理顺序排列
    pub const ALL: [Role; 2] = [Role::Model, Role::Student];

    pub fn name(self) -> &'static str {
        match self {
            Role::Model => "model",
            Role::Student => "student",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 上传的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// 原始文件名（带扩展名）
    pub name: String,
    /// MIME 类型（无法识别时为 None）
    pub mime: Option<String>,
    /// 文件内容
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }

    /// 从磁盘读取文件，并根据文件头识别 MIME 类型
    ///
    /// 超过大小上限的文件只读取文件头做类型判断，不整体载入内存；
    /// 此时返回的错误可 downcast 为 `ValidationError`
    pub async fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let size = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("无法读取文件信息: {}", path.display()))?
            .len();

        if size > MAX_FILE_SIZE {
            let header = read_header(path).await?;
            let mime = detect_mime(&name, &header);
            check_type(&name, mime.as_deref())?;
            return Err(ValidationError::TooLarge {
                name,
                size,
                max: MAX_FILE_SIZE,
            }
            .into());
        }

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("无法读取文件: {}", path.display()))?;

        let mime = detect_mime(&name, &bytes);
        tracing::debug!("读取文件 {}: {} 字节, MIME={:?}", name, bytes.len(), mime);

        Ok(Self { name, mime, bytes })
    }

    /// 文件大小（字节）
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// 小写扩展名（不带点）
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }

    /// 校验类型与大小
    ///
    /// 类型：MIME 或扩展名任一命中允许列表即可；先校验类型，再校验大小
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_type(&self.name, self.mime.as_deref())?;

        if self.size() > MAX_FILE_SIZE {
            return Err(ValidationError::TooLarge {
                name: self.name.clone(),
                size: self.size(),
                max: MAX_FILE_SIZE,
            });
        }

        Ok(())
    }

    /// 上传时使用的 MIME 类型
    pub fn content_type(&self) -> &str {
        self.mime.as_deref().unwrap_or("application/octet-stream")
    }
}

/// MIME 或扩展名任一命中允许列表即可
fn check_type(name: &str, mime: Option<&str>) -> Result<(), ValidationError> {
    let mime_ok = mime.is_some_and(|m| ALLOWED_MIME_TYPES.contains(m));
    let ext_ok = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ALLOWED_EXTENSIONS.contains(e.to_lowercase().as_str()));

    if mime_ok || ext_ok {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedType {
            name: name.to_string(),
        })
    }
}

/// 只读取文件开头，用于识别类型
async fn read_header(path: &Path) -> Result<Vec<u8>> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("无法打开文件: {}", path.display()))?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64)
        .read_to_end(&mut header)
        .await
        .with_context(|| format!("无法读取文件头: {}", path.display()))?;
    Ok(header)
}

/// 根据文件头识别 MIME；纯文本没有魔数，按扩展名 + UTF-8 判断
fn detect_mime(name: &str, bytes: &[u8]) -> Option<String> {
    if let Some(kind) = infer::get(bytes) {
        return Some(kind.mime_type().to_string());
    }

    let is_txt = name.to_lowercase().ends_with(".txt");
    if is_txt && std::str::from_utf8(bytes).is_ok() {
        return Some("text/plain".to_string());
    }

    None
}

/// 格式化文件大小，例如 "1.5 KB"、"10 MB"
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let k = 1024f64;
    let value = bytes as f64;
    let index = ((value.ln() / k.ln()).floor() as usize).min(UNITS.len() - 1);
    let scaled = value / k.powi(index as i32);

    let formatted = format!("{:.2}", scaled);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[index])
}
