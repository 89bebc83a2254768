use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;

pub mod prompt;

// 全局 HTTP 客户端复用
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client")
});

/// 推理请求结构
#[derive(Serialize)]
pub struct InferenceRequest<'a> {
    pub inputs: &'a str,
}

/// 推理响应中的单条生成结果
#[derive(Deserialize)]
pub struct GeneratedChunk {
    #[serde(default)]
    pub generated_text: String,
}

/// 单次推理调用的结局
///
/// 传输失败和上游非 200 都不作为错误向上传播，由归一化层渲染成
/// 统一的审查结果，这里只负责区分三种情况。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceOutcome {
    /// 上游 200，携带第一条 generated_text（可能为空串）
    Generated(String),
    /// 网络层失败（DNS、连接拒绝、超时等）
    TransportError(String),
    /// 上游返回非 200 状态码
    UpstreamStatus(u16),
}

/// 向推理端点发起一次调用，不做任何重试
pub async fn generate_review_text(review_prompt: &str, config: &Config) -> InferenceOutcome {
    let client = &*HTTP_CLIENT;
    let request = InferenceRequest {
        inputs: review_prompt,
    };

    let mut builder = client
        .post(&config.inference_url)
        .json(&request)
        .timeout(Duration::from_secs(config.timeout_secs));
    if let Some(token) = &config.api_token {
        builder = builder.bearer_auth(token);
    }

    let response = match builder.send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, url = %config.inference_url, "推理服务请求失败");
            return InferenceOutcome::TransportError(e.to_string());
        }
    };

    // 上游契约：成功状态码严格等于 200
    let status = response.status().as_u16();
    if status != 200 {
        tracing::warn!(status, "推理服务返回非 200 状态码");
        return InferenceOutcome::UpstreamStatus(status);
    }

    // 响应体形如 [{"generated_text": "..."}]，取第一条；
    // 空序列、字段缺失或响应体不可解析都按空串处理
    let chunks: Vec<GeneratedChunk> = match response.json().await {
        Ok(chunks) => chunks,
        Err(e) => {
            tracing::warn!(error = %e, "推理响应体不符合预期格式，按空输出处理");
            Vec::new()
        }
    };

    let text = chunks
        .into_iter()
        .next()
        .map(|chunk| chunk.generated_text)
        .unwrap_or_default();

    InferenceOutcome::Generated(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_singleton() {
        // 测试 HTTP 客户端是否是单例
        let client1 = &*HTTP_CLIENT;
        let client2 = &*HTTP_CLIENT;

        assert!(std::ptr::eq(client1, client2));
    }

    #[test]
    fn test_inference_request_serialization() {
        let request = InferenceRequest {
            inputs: "Analyze this python code",
        };

        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"inputs":"Analyze this python code"}"#);
    }

    #[test]
    fn test_generated_chunk_deserialization() {
        let json = r#"[{"generated_text": "some review"}]"#;
        let chunks: Vec<GeneratedChunk> = serde_json::from_str(json).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].generated_text, "some review");
    }

    #[test]
    fn test_generated_chunk_missing_field_defaults_empty() {
        // 缺失 generated_text 字段时回退空串
        let json = r#"[{"other_field": 1}]"#;
        let chunks: Vec<GeneratedChunk> = serde_json::from_str(json).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].generated_text, "");
    }

    #[test]
    fn test_empty_response_sequence() {
        let json = "[]";
        let chunks: Vec<GeneratedChunk> = serde_json::from_str(json).unwrap();

        let text = chunks
            .into_iter()
            .next()
            .map(|chunk| chunk.generated_text)
            .unwrap_or_default();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_transport_error_outcome() {
        // 绑定后立刻释放端口，得到一个必然连接拒绝的地址
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut config = test_config();
        config.inference_url = format!("http://{}/generate", addr);

        let outcome = generate_review_text("prompt", &config).await;
        match outcome {
            InferenceOutcome::TransportError(detail) => assert!(!detail.is_empty()),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            inference_url: "http://127.0.0.1:0/".to_string(),
            api_token: None,
            timeout_secs: 5,
            debug: false,
        }
    }
}
