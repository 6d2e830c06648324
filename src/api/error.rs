// ==========================================
// 站点资源运营分析 - API层错误类型
// ==========================================
// 职责: 汇总各层错误, 提供用户可读的错误类别与受影响标识
// 可解释性: 所有错误必须能指出类别与受影响对象
// ==========================================

use crate::config::error::ConfigError;
use crate::engine::error::EngineError;
use crate::importer::error::ImportError;
use crate::report::error::ReportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 致命错误 (中止运行)
    // ==========================================
    #[error("数据加载失败: {0}")]
    Load(#[from] ImportError),

    #[error("配置错误: {0}")]
    Configuration(#[from] ConfigError),

    #[error("数据质量错误 ({record_key}): {message}")]
    DataQuality { record_key: String, message: String },

    #[error("输入为空: 没有可处理的站点日记录")]
    EmptyInput,

    #[error("报告输出失败: {0}")]
    Report(#[from] ReportError),

    // ==========================================
    // 查询错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::EmptyInput => ApiError::EmptyInput,
            EngineError::Configuration(e) => ApiError::Configuration(e),
            EngineError::DataQuality { record_key, issue } => ApiError::DataQuality {
                record_key,
                message: issue.to_string(),
            },
        }
    }
}

impl ApiError {
    /// 错误类别 (CLI 输出)
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::Load(_) => "LoadError",
            ApiError::Configuration(_) => "ConfigurationError",
            ApiError::DataQuality { .. } => "DataQualityError",
            ApiError::EmptyInput => "EmptyInputError",
            ApiError::Report(_) => "ReportError",
            ApiError::InvalidInput(_) => "InvalidInput",
            ApiError::NotFound(_) => "NotFound",
            ApiError::Other(_) => "InternalError",
        }
    }

    /// 受影响的标识
    pub fn affected_ids(&self) -> Vec<String> {
        match self {
            ApiError::Load(e) => e.affected_ids(),
            ApiError::Configuration(e) => e.key().map(|k| vec![k.to_string()]).unwrap_or_default(),
            ApiError::DataQuality { record_key, .. } => vec![record_key.clone()],
            ApiError::Report(e) => e.affected_ids(),
            ApiError::NotFound(id) => vec![id.clone()],
            ApiError::EmptyInput | ApiError::InvalidInput(_) | ApiError::Other(_) => Vec::new(),
        }
    }

    /// 进程退出码 (非 0)
    pub fn exit_code(&self) -> u8 {
        match self {
            ApiError::Load(_) | ApiError::EmptyInput => 2,
            ApiError::Configuration(_) => 3,
            ApiError::DataQuality { .. } => 4,
            ApiError::Report(_) => 5,
            ApiError::InvalidInput(_) | ApiError::NotFound(_) => 64,
            ApiError::Other(_) => 1,
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kpi::DataQualityIssue;

    #[test]
    fn test_engine_error_conversion() {
        let err: ApiError = EngineError::DataQuality {
            record_key: "S1@2025-01-01".to_string(),
            issue: DataQualityIssue::OutOfRange {
                field: "loss_rate".to_string(),
                value: 1.2,
            },
        }
        .into();

        assert_eq!(err.category(), "DataQualityError");
        assert_eq!(err.affected_ids(), vec!["S1@2025-01-01".to_string()]);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn test_config_error_category() {
        let err: ApiError = ConfigError::MissingField("watch_loss_rate".to_string()).into();
        assert_eq!(err.category(), "ConfigurationError");
        assert_eq!(err.affected_ids(), vec!["watch_loss_rate".to_string()]);
    }

    #[test]
    fn test_load_error_category() {
        let err: ApiError = ImportError::MissingColumns {
            file: "daily.csv".to_string(),
            columns: vec!["unit_cost".to_string()],
        }
        .into();
        assert_eq!(err.category(), "LoadError");
        assert_eq!(err.affected_ids(), vec!["unit_cost".to_string()]);
    }

    #[test]
    fn test_empty_input() {
        let err: ApiError = EngineError::EmptyInput.into();
        assert_eq!(err.category(), "EmptyInputError");
        assert!(err.affected_ids().is_empty());
    }
}
