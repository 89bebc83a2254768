use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::ai;
use crate::ai::prompt;
use crate::config::Config;
use crate::review::{ReviewRequest, ReviewResult};

/// 服务启动阶段的错误
///
/// 请求处理阶段不产生错误：/review 在任何上游失败下都返回 200。
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("监听地址无效: {0}")]
    InvalidAddr(#[from] std::net::AddrParseError),

    #[error("无法绑定监听地址: {0}")]
    Bind(#[source] std::io::Error),

    #[error("HTTP 服务异常退出: {0}")]
    Serve(#[source] std::io::Error),
}

pub fn build_router(config: Arc<Config>) -> Router {
    // 任意来源、方法、头部均放行，允许携带凭证（镜像请求来源）
    Router::new()
        .route("/", get(root))
        .route("/review", post(review_code))
        .layer(CorsLayer::very_permissive())
        .with_state(config)
}

pub async fn serve(config: Arc<Config>) -> Result<(), ServerError> {
    let addr: std::net::SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let router = build_router(config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(ServerError::Bind)?;
    info!("CodeRefine backend listening on http://{}", addr);

    axum::serve(listener, router).await.map_err(ServerError::Serve)
}

/// GET / - 存活探测
async fn root() -> Json<Value> {
    Json(json!({ "message": "CodeRefine backend is running!" }))
}

/// POST /review - 无论上游结局如何都返回 200 和完整的 ReviewResult
async fn review_code(
    State(config): State<Arc<Config>>,
    Json(request): Json<ReviewRequest>,
) -> Json<ReviewResult> {
    info!(
        language = %request.language,
        code_len = request.code.len(),
        "收到代码审查请求"
    );

    let review_prompt = prompt::get_prompt(&request.language, &request.code);
    let outcome = ai::generate_review_text(&review_prompt, &config).await;

    Json(ReviewResult::from_outcome(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            inference_url: "http://127.0.0.1:1/".to_string(),
            api_token: None,
            timeout_secs: 5,
            debug: false,
        }
    }

    #[test]
    fn test_build_router() {
        // 路由构建不应 panic
        let _router = build_router(Arc::new(test_config()));
    }

    #[tokio::test]
    async fn test_root_banner() {
        let Json(body) = root().await;
        assert_eq!(body, json!({ "message": "CodeRefine backend is running!" }));
    }

    #[tokio::test]
    async fn test_serve_rejects_invalid_addr() {
        let mut config = test_config();
        config.host = "not an address".to_string();

        let result = serve(Arc::new(config)).await;
        assert!(matches!(result, Err(ServerError::InvalidAddr(_))));
    }
}
