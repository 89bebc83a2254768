use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(
    name = "code-refine",
    version,
    about = "CodeRefine 后端服务 - 将代码片段转发到 AI 推理端点并返回结构化审查结果"
)]
pub struct Args {
    /// 监听地址
    #[arg(long, default_value = "")] // 空字符串表示未指定
    pub host: String,

    /// 监听端口
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// 推理端点 URL
    #[arg(long = "inference-url", value_name = "URL", default_value = "")]
    pub inference_url: String,

    /// 单次推理调用超时（秒）
    #[arg(long = "timeout-secs", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// 输出调试日志
    #[arg(short, long, default_value_t = false)]
    pub debug: bool,
}
