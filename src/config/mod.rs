// ==========================================
// 站点资源运营分析 - 配置层
// ==========================================
// 职责: 阈值/建议动作/路径配置, 支持文件与环境变量覆写
// ==========================================

pub mod config_manager;
pub mod error;
pub mod thresholds;

// 重导出核心配置类型
pub use config_manager::{config_keys, default_config_path, AppConfig, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use thresholds::RiskThresholds;
