// ==========================================
// 站点资源运营分析 - 配置错误类型
// ==========================================
// 工具: thiserror 派生宏
// 致命错误: 分级开始前中止运行
// ==========================================

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("配置缺少必填字段: {0}")]
    MissingField(String),

    #[error("配置存在未知字段: {0}")]
    UnknownField(String),

    #[error("配置值无效 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("阈值顺序不单调: {watch_key}={watch} 不应严于 {intervention_key}={intervention}")]
    NonMonotonic {
        watch_key: String,
        watch: f64,
        intervention_key: String,
        intervention: f64,
    },

    #[error("配置文件读取失败 ({path}): {message}")]
    FileRead { path: String, message: String },

    #[error("配置解析失败: {0}")]
    Parse(String),
}

impl ConfigError {
    /// 将 serde_json 错误映射为更明确的配置错误
    pub fn from_json(err: &serde_json::Error) -> Self {
        let message = err.to_string();

        if let Some(field) = backticked(&message, "missing field") {
            return ConfigError::MissingField(field);
        }
        if let Some(field) = backticked(&message, "unknown field") {
            return ConfigError::UnknownField(field);
        }

        ConfigError::Parse(message)
    }

    /// 受影响的配置键
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField(k) | ConfigError::UnknownField(k) => Some(k),
            ConfigError::InvalidValue { key, .. } => Some(key),
            ConfigError::NonMonotonic { watch_key, .. } => Some(watch_key),
            ConfigError::FileRead { .. } | ConfigError::Parse(_) => None,
        }
    }
}

/// 提取 "<prefix> `name`" 中的 name
fn backticked(message: &str, prefix: &str) -> Option<String> {
    let rest = &message[message.find(prefix)? + prefix.len()..];
    let start = rest.find('`')? + 1;
    let end = start + rest[start..].find('`')?;
    Some(rest[start..end].to_string())
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    #[serde(deny_unknown_fields)]
    #[allow(dead_code)]
    struct Probe {
        a: f64,
    }

    #[test]
    fn test_from_json_missing_field() {
        let err = serde_json::from_str::<Probe>("{}").unwrap_err();
        assert_eq!(ConfigError::from_json(&err), ConfigError::MissingField("a".to_string()));
    }

    #[test]
    fn test_from_json_unknown_field() {
        let err = serde_json::from_str::<Probe>(r#"{"a": 1.0, "b": 2}"#).unwrap_err();
        assert_eq!(ConfigError::from_json(&err), ConfigError::UnknownField("b".to_string()));
    }

    #[test]
    fn test_from_json_syntax() {
        let err = serde_json::from_str::<Probe>("{").unwrap_err();
        assert!(matches!(ConfigError::from_json(&err), ConfigError::Parse(_)));
    }
}
