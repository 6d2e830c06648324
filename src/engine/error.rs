// ==========================================
// 站点资源运营分析 - 引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 数据质量问题默认只标记; FailFast 策略下升级为错误
// ==========================================

use crate::config::error::ConfigError;
use crate::domain::kpi::DataQualityIssue;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("输入为空: 没有可处理的站点日记录")]
    EmptyInput,

    #[error("配置错误: {0}")]
    Configuration(#[from] ConfigError),

    #[error("数据质量错误 ({record_key}): {issue}")]
    DataQuality {
        record_key: String,
        issue: DataQualityIssue,
    },
}

impl EngineError {
    /// 受影响的标识 (记录键或配置键)
    pub fn affected_ids(&self) -> Vec<String> {
        match self {
            EngineError::EmptyInput => Vec::new(),
            EngineError::Configuration(e) => e.key().map(|k| vec![k.to_string()]).unwrap_or_default(),
            EngineError::DataQuality { record_key, .. } => vec![record_key.clone()],
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
