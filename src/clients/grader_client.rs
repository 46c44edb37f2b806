/// 抽取 / 评测服务 API 客户端
///
/// 封装所有与远程服务相关的 HTTP 调用
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, AppResult, ConfigError};
use crate::models::{EvaluationRequest, EvaluationResult, UploadFile};

pub const EXTRACT_ENDPOINT: &str = "/extractFileText";
pub const EVALUATION_ENDPOINT: &str = "/evaluation";

/// 远程服务能力
///
/// 流程层只依赖这个 trait，测试时可以替换为 mock
pub trait GraderApi: Send + Sync {
    /// 上传单个文件，返回抽取出的文本
    fn extract_text<'a>(&'a self, file: &'a UploadFile) -> BoxFuture<'a, Result<String, ApiError>>;

    /// 提交两段文本，返回评测分数
    fn evaluate<'a>(
        &'a self,
        model: &'a str,
        student: &'a str,
    ) -> BoxFuture<'a, Result<EvaluationResult, ApiError>>;
}

/// `/extractFileText` 响应
#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    extracted_text: Option<String>,
}

/// 基于 reqwest 的客户端
pub struct GraderClient {
    http: Client,
    base_url: String,
}

impl GraderClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn post_extract(&self, file: &UploadFile) -> Result<String, ApiError> {
        debug!(
            "上传文件 {} ({} 字节, {})",
            file.name,
            file.size(),
            file.content_type()
        );

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(file.content_type())
            .map_err(|e| ApiError::request_failed(EXTRACT_ENDPOINT, e))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.url(EXTRACT_ENDPOINT))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::request_failed(EXTRACT_ENDPOINT, e))?;

        let body: ExtractResponse = read_json(EXTRACT_ENDPOINT, response).await?;
        Ok(body.extracted_text.unwrap_or_default())
    }

    async fn post_evaluation(
        &self,
        model: &str,
        student: &str,
    ) -> Result<EvaluationResult, ApiError> {
        debug!(
            "提交评测: model {} 字符, student {} 字符",
            model.len(),
            student.len()
        );

        let response = self
            .http
            .post(self.url(EVALUATION_ENDPOINT))
            .json(&EvaluationRequest { model, student })
            .send()
            .await
            .map_err(|e| ApiError::request_failed(EVALUATION_ENDPOINT, e))?;

        read_json(EVALUATION_ENDPOINT, response).await
    }
}

impl GraderApi for GraderClient {
    fn extract_text<'a>(&'a self, file: &'a UploadFile) -> BoxFuture<'a, Result<String, ApiError>> {
        self.post_extract(file).boxed()
    }

    fn evaluate<'a>(
        &'a self,
        model: &'a str,
        student: &'a str,
    ) -> BoxFuture<'a, Result<EvaluationResult, ApiError>> {
        self.post_evaluation(model, student).boxed()
    }
}

/// 检查状态码并解析 JSON 响应
async fn read_json<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::request_failed(endpoint, e))?;

    if !status.is_success() {
        return Err(ApiError::BadStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    debug!("{} 响应 {} 字节", endpoint, body.len());

    parse_body(&body)
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::JsonParseFailed {
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_trims_trailing_slash() {
        let config = Config {
            api_base_url: "http://127.0.0.1:8000/".to_string(),
            ..Config::default()
        };
        let client = GraderClient::new(&config).unwrap();
        assert_eq!(
            client.url(EXTRACT_ENDPOINT),
            "http://127.0.0.1:8000/extractFileText"
        );
    }

    #[test]
    fn test_extract_response_missing_text_defaults_to_empty() {
        let body: ExtractResponse = parse_body(r#"{"message":"File processed successfully"}"#).unwrap();
        assert_eq!(body.extracted_text.unwrap_or_default(), "");

        let body: ExtractResponse = parse_body(r#"{"extracted_text":"hello"}"#).unwrap();
        assert_eq!(body.extracted_text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let result: Result<EvaluationResult, ApiError> = parse_body("<html>");
        assert!(matches!(result, Err(ApiError::JsonParseFailed { .. })));
    }

    /// 需要本地启动抽取服务：cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_live_evaluation() {
        let _ = tracing_subscriber::fmt::try_init();

        let client = GraderClient::new(&Config::from_env().unwrap()).unwrap();
        let result = client
            .evaluate("The mitochondria is the powerhouse of the cell.", "Mitochondria make energy.")
            .await;

        match result {
            Ok(r) => println!("✅ 评测成功: {:?}", r),
            Err(e) => panic!("评测失败: {}", e),
        }
    }
}
