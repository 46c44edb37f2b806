//! 集成测试公共工具：可编排的 mock 服务

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use answer_checker::config::Config;
use answer_checker::error::ApiError;
use answer_checker::models::{EvaluationResult, UploadFile};
use answer_checker::{GraderApi, SessionStore};
use futures::future::{BoxFuture, FutureExt};

/// mock 抽取 / 评测服务
///
/// - 按文件名返回预设文本或状态码
/// - 记录调用顺序
/// - 可在抽取某个文件时先重置会话，模拟"请求在途时用户点了重置"
#[derive(Default)]
pub struct MockGrader {
    extract_responses: Mutex<HashMap<String, Result<String, u16>>>,
    evaluation_response: Mutex<Option<Result<EvaluationResult, u16>>>,
    reset_on: Mutex<Option<(String, SessionStore)>>,
    pub extract_calls: Mutex<Vec<String>>,
    pub evaluate_calls: AtomicU32,
}

impl MockGrader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, file_name: &str, text: &str) -> Self {
        self.set_text(file_name, text);
        self
    }

    pub fn with_status(self, file_name: &str, status: u16) -> Self {
        self.set_status(file_name, status);
        self
    }

    pub fn with_evaluation(self, result: EvaluationResult) -> Self {
        *self.evaluation_response.lock().unwrap() = Some(Ok(result));
        self
    }

    pub fn with_evaluation_status(self, status: u16) -> Self {
        *self.evaluation_response.lock().unwrap() = Some(Err(status));
        self
    }

    pub fn reset_session_on(self, file_name: &str, session: SessionStore) -> Self {
        *self.reset_on.lock().unwrap() = Some((file_name.to_string(), session));
        self
    }

    pub fn set_text(&self, file_name: &str, text: &str) {
        self.extract_responses
            .lock()
            .unwrap()
            .insert(file_name.to_string(), Ok(text.to_string()));
    }

    pub fn set_status(&self, file_name: &str, status: u16) {
        self.extract_responses
            .lock()
            .unwrap()
            .insert(file_name.to_string(), Err(status));
    }

    pub fn calls_for(&self, file_name: &str) -> usize {
        self.extract_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.as_str() == file_name)
            .count()
    }

    pub fn call_order(&self) -> Vec<String> {
        self.extract_calls.lock().unwrap().clone()
    }

    pub fn evaluate_count(&self) -> u32 {
        self.evaluate_calls.load(Ordering::SeqCst)
    }
}

fn bad_status(endpoint: &str, status: u16) -> ApiError {
    ApiError::BadStatus {
        endpoint: endpoint.to_string(),
        status,
        body: "mock failure".to_string(),
    }
}

impl GraderApi for MockGrader {
    fn extract_text<'a>(&'a self, file: &'a UploadFile) -> BoxFuture<'a, Result<String, ApiError>> {
        async move {
            self.extract_calls.lock().unwrap().push(file.name.clone());

            let reset = self
                .reset_on
                .lock()
                .unwrap()
                .as_ref()
                .filter(|(name, _)| name == &file.name)
                .map(|(_, session)| session.clone());
            if let Some(session) = reset {
                session.reset().await.unwrap();
            }

            let response = self.extract_responses.lock().unwrap().get(&file.name).cloned();
            match response {
                Some(Ok(text)) => Ok(text),
                Some(Err(status)) => Err(bad_status("/extractFileText", status)),
                None => Err(bad_status("/extractFileText", 404)),
            }
        }
        .boxed()
    }

    fn evaluate<'a>(
        &'a self,
        _model: &'a str,
        _student: &'a str,
    ) -> BoxFuture<'a, Result<EvaluationResult, ApiError>> {
        async move {
            self.evaluate_calls.fetch_add(1, Ordering::SeqCst);
            match self.evaluation_response.lock().unwrap().clone() {
                Some(Ok(result)) => Ok(result),
                Some(Err(status)) => Err(bad_status("/evaluation", status)),
                None => Err(bad_status("/evaluation", 500)),
            }
        }
        .boxed()
    }
}

pub fn pdf(name: &str) -> UploadFile {
    UploadFile::new(name, Some("application/pdf".to_string()), b"%PDF-1.4 mock".to_vec())
}

/// 重试间隔极短的配置
pub fn fast_config() -> Config {
    Config {
        evaluation_max_attempts: 2,
        evaluation_retry_delay_ms: 1,
        ..Config::default()
    }
}

pub fn sample_evaluation() -> EvaluationResult {
    EvaluationResult {
        keyword: 0.8,
        semantics: 0.75,
        tone: "Neutral".to_string(),
        tone_score: 0.6,
    }
}
