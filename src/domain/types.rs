// ==========================================
// 站点资源运营分析 - 领域类型定义
// ==========================================
// 风险分级 / 损耗驱动 / 数据质量策略
// ==========================================

use crate::i18n::t;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 风险分级 (Risk Classification)
// ==========================================
// 红线: 分级制,不是评分制
// 顺序: Normal < Watch < InterventionRequired
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskClassification {
    Normal,               // 正常
    Watch,                // 关注
    InterventionRequired, // 需要干预
}

impl RiskClassification {
    /// 全部分级（按严重度升序）
    pub const ALL: [RiskClassification; 3] = [
        RiskClassification::Normal,
        RiskClassification::Watch,
        RiskClassification::InterventionRequired,
    ];

    /// 本地化显示名称
    pub fn label(&self) -> String {
        match self {
            RiskClassification::Normal => t("risk.normal"),
            RiskClassification::Watch => t("risk.watch"),
            RiskClassification::InterventionRequired => t("risk.intervention_required"),
        }
    }

    /// 从字符串解析分级
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "NORMAL" => Some(RiskClassification::Normal),
            "WATCH" => Some(RiskClassification::Watch),
            "INTERVENTION_REQUIRED" => Some(RiskClassification::InterventionRequired),
            _ => None,
        }
    }
}

impl fmt::Display for RiskClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskClassification::Normal => write!(f, "NORMAL"),
            RiskClassification::Watch => write!(f, "WATCH"),
            RiskClassification::InterventionRequired => write!(f, "INTERVENTION_REQUIRED"),
        }
    }
}

// ==========================================
// 损耗驱动 (Loss Driver)
// ==========================================
// 声明顺序即并列时的优先顺序:
// Overproduction > TimingMismatch > Spoilage > Damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossDriver {
    Overproduction, // 计划过量
    TimingMismatch, // 供需时间错配 (计划缺口)
    Spoilage,       // 变质
    Damage,         // 破损
}

impl LossDriver {
    /// 并列裁决优先顺序
    pub const PRECEDENCE: [LossDriver; 4] = [
        LossDriver::Overproduction,
        LossDriver::TimingMismatch,
        LossDriver::Spoilage,
        LossDriver::Damage,
    ];

    /// 源数据中的原因代码
    pub fn code(&self) -> &'static str {
        match self {
            LossDriver::Overproduction => "overproduction",
            LossDriver::TimingMismatch => "timing_mismatch",
            LossDriver::Spoilage => "spoilage",
            LossDriver::Damage => "damage",
        }
    }

    /// 从原因代码解析（大小写/空格不敏感）
    pub fn from_code(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        LossDriver::PRECEDENCE
            .into_iter()
            .find(|d| d.code() == normalized)
    }

    /// 本地化显示名称
    pub fn label(&self) -> String {
        t(&format!("driver.{}", self.code()))
    }
}

impl fmt::Display for LossDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 数据质量策略 (Data Quality Policy)
// ==========================================
// 超范围 KPI 的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataQualityPolicy {
    #[default]
    FlagAndContinue, // 标记并继续 (默认)
    FailFast,        // 立即中止
}

impl fmt::Display for DataQualityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQualityPolicy::FlagAndContinue => write!(f, "FLAG_AND_CONTINUE"),
            DataQualityPolicy::FailFast => write!(f, "FAIL_FAST"),
        }
    }
}
