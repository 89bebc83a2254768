use serde::{Deserialize, Deserializer, Serialize};

use crate::ai::InferenceOutcome;

/// 上游调用失败时填入三个列表字段的固定文案
pub const AI_CALL_ERROR: &str = "Error calling AI";

/// 审查请求：language 和 code 均为必填，内容不做校验
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub language: String,
    pub code: String,
}

/// 审查结果，/review 接口的唯一输出形态，四个字段始终全部填充
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub bugs: Vec<String>,
    pub performance_issues: Vec<String>,
    pub best_practices: Vec<String>,
    pub optimized_code: String,
}

/// 模型输出的宽松解码形态
///
/// 顶层必须是 JSON 对象，字段逐个解码：缺失或类型不符的字段回退
/// 默认值，而不是让整个对象解析失败。
#[derive(Debug, Deserialize)]
struct ModelReviewOutput {
    #[serde(default, deserialize_with = "field_or_default")]
    bugs: Vec<String>,
    #[serde(default, deserialize_with = "field_or_default")]
    performance_issues: Vec<String>,
    #[serde(default, deserialize_with = "field_or_default")]
    best_practices: Vec<String>,
    #[serde(default, deserialize_with = "field_or_default")]
    optimized_code: String,
}

// 类型不匹配时回退 Default，不中断整体解码
fn field_or_default<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: serde::de::DeserializeOwned + Default,
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl ReviewResult {
    fn empty_with_code(optimized_code: String) -> Self {
        Self {
            bugs: Vec::new(),
            performance_issues: Vec::new(),
            best_practices: Vec::new(),
            optimized_code,
        }
    }

    fn ai_error(optimized_code: String) -> Self {
        Self {
            bugs: vec![AI_CALL_ERROR.to_string()],
            performance_issues: vec![AI_CALL_ERROR.to_string()],
            best_practices: vec![AI_CALL_ERROR.to_string()],
            optimized_code,
        }
    }

    /// 解析模型生成文本
    ///
    /// 合法 JSON 对象按字段读取；其余情况（非法 JSON、非对象）全部
    /// 列表字段置空，原文透传到 optimized_code。
    pub fn from_generated_text(text: &str) -> Self {
        match serde_json::from_str::<ModelReviewOutput>(text) {
            Ok(output) => Self {
                bugs: output.bugs,
                performance_issues: output.performance_issues,
                best_practices: output.best_practices,
                optimized_code: output.optimized_code,
            },
            Err(e) => {
                tracing::warn!(error = %e, "模型输出不是合法 JSON 对象，原文透传");
                Self::empty_with_code(text.to_string())
            }
        }
    }

    /// 把一次推理调用的结局归一化为审查结果
    ///
    /// 任何失败都不向调用方抛错，调用方只通过字段内容区分失败原因。
    pub fn from_outcome(outcome: InferenceOutcome) -> Self {
        match outcome {
            InferenceOutcome::TransportError(detail) => Self::ai_error(detail),
            InferenceOutcome::UpstreamStatus(status) => {
                Self::ai_error(format!("Status code: {}", status))
            }
            InferenceOutcome::Generated(text) => Self::from_generated_text(&text),
        }
    }
}
