// ==========================================
// 站点资源运营分析 - 报告错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("报告写入失败 ({path}): {message}")]
    WriteError { path: String, message: String },

    #[error("输出契约序列化失败: {0}")]
    SerializeError(String),

    #[error("报告渲染失败: {0}")]
    RenderError(String),
}

impl ReportError {
    pub fn affected_ids(&self) -> Vec<String> {
        match self {
            ReportError::WriteError { path, .. } => vec![path.clone()],
            ReportError::SerializeError(_) | ReportError::RenderError(_) => Vec::new(),
        }
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::SerializeError(err.to_string())
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
