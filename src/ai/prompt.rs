use once_cell::sync::Lazy;
use std::env;
use std::fs;
use std::sync::RwLock;

// 提示模板缓存
static PROMPT_CACHE: Lazy<RwLock<Option<String>>> = Lazy::new(|| RwLock::new(None));

// 加载提示模板（仅执行一次）
fn load_prompt_template() -> String {
    let default_path = "review-prompt.txt";
    let prompt_path = if std::path::Path::new(default_path).exists() {
        default_path.to_owned()
    } else {
        // 如果项目中不存在，则检查环境变量配置
        env::var("CODE_REFINE_PROMPT_PATH").unwrap_or_else(|_| default_path.to_owned())
    };

    // 尝试读取外部文件，失败则使用内置模板
    if std::path::Path::new(&prompt_path).exists() {
        match fs::read_to_string(&prompt_path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("无法读取提示词文件 {}: {}，使用内置模板", prompt_path, e);
                include_str!("../../review-prompt.txt").to_owned()
            }
        }
    } else {
        // 内置默认模板，编译时读取 review-prompt.txt
        include_str!("../../review-prompt.txt").to_owned()
    }
}

/// 生成审查提示词：语言名与代码原样内插，不做任何转义
pub fn get_prompt(language: &str, code: &str) -> String {
    // 检查缓存
    {
        let cache = PROMPT_CACHE.read().unwrap();
        if let Some(ref template) = *cache {
            return template
                .replace("{{language}}", language)
                .replace("{{code}}", code);
        }
    }

    // 加载并缓存模板
    let template = load_prompt_template();
    *PROMPT_CACHE.write().unwrap() = Some(template.clone());

    template
        .replace("{{language}}", language)
        .replace("{{code}}", code)
}
