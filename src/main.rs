use clap::Parser;
use code_refine::cli::args::Args;
use code_refine::config::Config;
use code_refine::server;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn setup_logging(debug: bool) {
    let default_directive = if debug {
        "code_refine=debug"
    } else {
        "code_refine=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::new();

    config.update_from_args(&args);
    config.validate()?;

    setup_logging(config.debug);

    if config.api_token.is_none() {
        tracing::warn!("未配置 CODE_REFINE_API_TOKEN，推理端点可能拒绝未认证的请求");
    }

    server::serve(Arc::new(config)).await?;
    Ok(())
}
