// ==========================================
// 站点资源运营分析 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 来源: 内置默认值 → JSON 配置文件 → 环境变量
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::thresholds::RiskThresholds;
use crate::domain::types::{DataQualityPolicy, LossDriver};
use crate::i18n;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// ==========================================
// AppConfig - 运行配置 (文件格式)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// 风险阈值 (整段缺省 → 默认值; 出现则字段必填)
    #[serde(default)]
    pub thresholds: RiskThresholds,

    /// 建议动作覆写 (损耗原因代码 → 文本)
    #[serde(default)]
    pub actions: BTreeMap<String, String>,

    /// 数据根目录
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    /// 数据环境子目录 (sample / raw)
    #[serde(default = "default_data_env")]
    pub data_env: String,

    /// 显式数据目录 (优先于 data_root/data_env)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// 报告输出目录
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// 界面/报告语言
    #[serde(default = "default_locale")]
    pub locale: String,

    /// 报告中展示的高风险站点数
    #[serde(default = "default_top_n_sites")]
    pub top_n_sites: usize,

    /// 超范围 KPI 处理策略
    #[serde(default)]
    pub data_quality_policy: DataQualityPolicy,
}

fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_data_env() -> String {
    "sample".to_string()
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_top_n_sites() -> usize {
    12
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
            actions: BTreeMap::new(),
            data_root: default_data_root(),
            data_env: default_data_env(),
            data_dir: None,
            reports_dir: default_reports_dir(),
            locale: default_locale(),
            top_n_sites: default_top_n_sites(),
            data_quality_policy: DataQualityPolicy::default(),
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    config: AppConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 使用内置默认值
    pub fn new() -> Self {
        Self::default()
    }

    /// 加载配置
    ///
    /// # 参数
    /// - path: 显式配置文件路径; 为 None 时尝试平台配置目录下的默认文件
    ///
    /// # 返回
    /// - Ok(ConfigManager): 已应用环境变量覆写并通过校验
    /// - Err(ConfigError): 文件读取/解析/校验失败
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut manager = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(p) => Self::from_file(&p)?,
                None => Self::new(),
            },
        };

        manager.apply_overrides(|key| std::env::var(key).ok());
        manager.validate()?;

        tracing::info!(
            source = ?manager.source,
            data_dir = %manager.data_dir().display(),
            locale = %manager.config.locale,
            "配置加载完成"
        );

        Ok(manager)
    }

    /// 从 JSON 文件读取配置
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut manager = Self::from_json_str(&raw)?;
        manager.source = Some(path.to_path_buf());
        Ok(manager)
    }

    /// 从 JSON 字符串读取配置
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: AppConfig =
            serde_json::from_str(raw).map_err(|e| ConfigError::from_json(&e))?;

        Ok(Self {
            config,
            source: None,
        })
    }

    /// 应用环境变量覆写
    ///
    /// # 参数
    /// - lookup: 环境变量查询函数 (便于测试注入)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup(config_keys::ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(data_env = %env, "环境变量覆写数据环境");
            self.config.data_env = env.trim().to_string();
        }

        if let Some(locale) = lookup(config_keys::ENV_LOCALE).filter(|v| !v.trim().is_empty()) {
            self.config.locale = locale.trim().to_string();
        }
    }

    /// 校验配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.config.thresholds.validate()?;
        self.action_overrides()?;

        if self.config.top_n_sites == 0 {
            return Err(ConfigError::InvalidValue {
                key: config_keys::TOP_N_SITES.to_string(),
                value: "0".to_string(),
                message: "至少展示 1 个站点".to_string(),
            });
        }

        if !i18n::is_supported(&self.config.locale) {
            return Err(ConfigError::InvalidValue {
                key: config_keys::LOCALE.to_string(),
                value: self.config.locale.clone(),
                message: "仅支持 en / zh-CN".to_string(),
            });
        }

        Ok(())
    }

    // ===== 访问器 =====

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn thresholds(&self) -> RiskThresholds {
        self.config.thresholds
    }

    pub fn locale(&self) -> &str {
        &self.config.locale
    }

    pub fn top_n_sites(&self) -> usize {
        self.config.top_n_sites
    }

    pub fn data_quality_policy(&self) -> DataQualityPolicy {
        self.config.data_quality_policy
    }

    /// 建议动作覆写 (已解析为损耗驱动)
    pub fn action_overrides(&self) -> ConfigResult<BTreeMap<LossDriver, String>> {
        let mut overrides = BTreeMap::new();
        for (code, text) in &self.config.actions {
            let driver = LossDriver::from_code(code).ok_or_else(|| ConfigError::InvalidValue {
                key: format!("{}.{}", config_keys::ACTIONS, code),
                value: text.clone(),
                message: "未知的损耗原因代码".to_string(),
            })?;
            overrides.insert(driver, text.clone());
        }
        Ok(overrides)
    }

    // ===== 路径 =====

    pub fn data_dir(&self) -> PathBuf {
        match &self.config.data_dir {
            Some(dir) => dir.clone(),
            None => self.config.data_root.join(&self.config.data_env),
        }
    }

    pub fn site_master_path(&self) -> PathBuf {
        self.data_dir().join(SITE_MASTER_FILE)
    }

    pub fn daily_data_path(&self) -> PathBuf {
        self.data_dir().join(DAILY_DATA_FILE)
    }

    /// 报告固定输出路径 (PDF)
    pub fn report_path(&self) -> PathBuf {
        self.config.reports_dir.join(REPORT_FILE)
    }

    /// Markdown 版报告路径
    pub fn markdown_report_path(&self) -> PathBuf {
        self.config.reports_dir.join(MARKDOWN_REPORT_FILE)
    }

    /// 输出契约 (JSON) 路径
    pub fn summary_path(&self) -> PathBuf {
        self.config.reports_dir.join(SUMMARY_FILE)
    }

    // ===== 覆写 (命令行) =====

    pub fn set_data_dir(&mut self, dir: PathBuf) {
        self.config.data_dir = Some(dir);
    }

    pub fn set_reports_dir(&mut self, dir: PathBuf) {
        self.config.reports_dir = dir;
    }

    pub fn set_locale(&mut self, locale: &str) {
        self.config.locale = locale.to_string();
    }

    /// 获取生效配置快照 (JSON)
    ///
    /// # 用途
    /// - 写入报告附录, 便于复核阈值口径
    pub fn config_snapshot(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(&self.config).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// 平台配置目录下的默认配置文件
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("site_ops.json"))
}

// ==========================================
// 文件名常量
// ==========================================
pub const SITE_MASTER_FILE: &str = "site_master.csv";
pub const DAILY_DATA_FILE: &str = "daily_site_resource.csv";
pub const REPORT_FILE: &str = "site_resource_ops_report.pdf";
pub const MARKDOWN_REPORT_FILE: &str = "site_resource_ops_report.md";
pub const SUMMARY_FILE: &str = "site_resource_ops_summary.json";

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 风险阈值
    pub const WATCH_LOSS_RATE: &str = "watch_loss_rate";
    pub const INTERVENTION_LOSS_RATE: &str = "intervention_loss_rate";
    pub const WATCH_UTILIZATION_FLOOR: &str = "watch_utilization_floor";
    pub const INTERVENTION_COST_LEAKAGE: &str = "intervention_cost_leakage";
    pub const WATCH_SITE_COST_LEAKAGE: &str = "watch_site_cost_leakage";
    pub const INTERVENTION_SITE_COST_LEAKAGE: &str = "intervention_site_cost_leakage";

    // 异常检测
    pub const ANOMALY_ZSCORE_THRESHOLD: &str = "anomaly_zscore_threshold";

    // 展示
    pub const ACTIONS: &str = "actions";
    pub const LOCALE: &str = "locale";
    pub const TOP_N_SITES: &str = "top_n_sites";

    // 环境变量
    pub const ENV_DATA_DIR: &str = "OPS_DATA_DIR";
    pub const ENV_LOCALE: &str = "OPS_LOCALE";
}
