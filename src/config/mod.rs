use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// 默认推理端点（Hugging Face Inference API）
const DEFAULT_INFERENCE_URL: &str =
    "https://api-inference.huggingface.co/models/Salesforce/codegen-350M-mono";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub inference_url: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
    pub debug: bool,
}

impl Config {
    pub fn new() -> Self {
        // 默认配置
        let mut config = Config {
            host: "0.0.0.0".to_string(),
            port: 8000,
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            api_token: None,
            timeout_secs: 60,
            debug: false,
        };

        // 加载配置文件
        #[cfg(not(test))]
        config.load_from_env_file();
        // 加载环境变量（覆盖配置文件）
        config.load_from_env();

        config
    }

    pub fn load_from_env_file(&mut self) {
        // 尝试从用户主目录加载
        if let Ok(home) = env::var("HOME") {
            let user_env_path = PathBuf::from(format!("{}/.code-refine/.env", home));
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }

        // 尝试从当前目录加载
        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) {
        if let Ok(host) = env::var("CODE_REFINE_HOST") {
            self.host = host;
        }
        if let Ok(port) = env::var("CODE_REFINE_PORT") {
            self.port = port.parse().unwrap_or(self.port);
        }
        if let Ok(url) = env::var("CODE_REFINE_INFERENCE_URL") {
            self.inference_url = url;
        }
        // 凭证只从环境读取，源码中不出现任何字面量
        if let Ok(token) = env::var("CODE_REFINE_API_TOKEN") {
            self.api_token = Some(token);
        }
        if let Ok(timeout) = env::var("CODE_REFINE_TIMEOUT_SECS") {
            self.timeout_secs = timeout.parse().unwrap_or(self.timeout_secs);
        }
        if let Ok(debug) = env::var("CODE_REFINE_DEBUG") {
            self.debug = debug.parse().unwrap_or(self.debug);
        }
    }

    pub fn update_from_args(&mut self, args: &crate::cli::args::Args) {
        // 命令行参数优先级最高
        if !args.host.is_empty() {
            self.host = args.host.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if !args.inference_url.is_empty() {
            self.inference_url = args.inference_url.clone();
        }
        if let Some(timeout) = args.timeout_secs {
            self.timeout_secs = timeout;
        }
        if args.debug {
            self.debug = true;
        }
    }

    /// 监听地址
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address '{}': {}", addr, e))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.inference_url.is_empty() {
            anyhow::bail!("Inference URL is required but not set. Please set CODE_REFINE_INFERENCE_URL environment variable or in .env file");
        }
        url::Url::parse(&self.inference_url)
            .map_err(|e| anyhow::anyhow!("Invalid inference URL '{}': {}", self.inference_url, e))?;
        if self.timeout_secs == 0 {
            anyhow::bail!("Timeout must be greater than 0 seconds");
        }
        self.bind_addr()?;
        Ok(())
    }
}
