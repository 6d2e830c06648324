// ==========================================
// 站点资源运营分析 - 站点与日运营记录
// ==========================================
// 职责: 站点主数据 + 站点日运营记录 (加载后只读)
// ==========================================

use crate::domain::types::LossDriver;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// SiteAttributes - 站点静态属性
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAttributes {
    pub site_id: String,                       // 站点ID
    pub site_type: Option<String>,             // 站点类型 (facility / warehouse / ...)
    pub capacity_units: Option<f64>,           // 日产能上限
    pub operating_days_per_week: Option<u32>,  // 每周运营天数
    pub is_structurally_high_loss: Option<bool>, // 结构性高损耗标记
}

impl SiteAttributes {
    /// 仅含站点ID的属性
    pub fn bare(site_id: &str) -> Self {
        Self {
            site_id: site_id.to_string(),
            site_type: None,
            capacity_units: None,
            operating_days_per_week: None,
            is_structurally_high_loss: None,
        }
    }
}

// ==========================================
// SiteMaster - 站点主数据映射
// ==========================================
// site_id → SiteAttributes, 有序存储保证遍历确定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteMaster {
    sites: BTreeMap<String, SiteAttributes>,
}

impl SiteMaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入站点 (返回被覆盖的旧值)
    pub fn insert(&mut self, attributes: SiteAttributes) -> Option<SiteAttributes> {
        self.sites.insert(attributes.site_id.clone(), attributes)
    }

    pub fn get(&self, site_id: &str) -> Option<&SiteAttributes> {
        self.sites.get(site_id)
    }

    pub fn contains(&self, site_id: &str) -> bool {
        self.sites.contains_key(site_id)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn site_ids(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(|k| k.as_str())
    }
}

impl FromIterator<SiteAttributes> for SiteMaster {
    fn from_iter<I: IntoIterator<Item = SiteAttributes>>(iter: I) -> Self {
        let mut master = SiteMaster::new();
        for attributes in iter {
            master.insert(attributes);
        }
        master
    }
}

// ==========================================
// SiteDayRecord - 站点日运营记录
// ==========================================
// 用途: KPI 引擎输入, 加载后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDayRecord {
    pub site_id: String,      // 站点ID
    pub date: NaiveDate,      // 日期

    // ===== 必填计数 =====
    pub planned_units: f64,   // 计划资源量
    pub actual_units: f64,    // 实际使用量
    pub disposed_units: f64,  // 损耗/报废量
    pub unit_cost: f64,       // 单位成本

    // ===== 可选计数 =====
    pub usable_units: Option<f64>,         // 可用量
    pub loss_reason: Option<LossDriver>,   // 上报损耗原因

    // ===== 运营冲击标记 =====
    pub staffing_shortfall: bool, // 人手不足
    pub supplier_delay: bool,     // 供应商延迟
    pub temp_excursion: bool,     // 温度偏离

    // ===== 元信息 =====
    pub row_number: usize,    // 源文件行号 (审计用)
}

impl SiteDayRecord {
    /// 是否存在任一运营冲击
    pub fn has_shock(&self) -> bool {
        self.staffing_shortfall || self.supplier_delay || self.temp_excursion
    }

    /// 记录标识 (site_id@date), 用于错误与告警输出
    pub fn record_key(&self) -> String {
        format!("{}@{}", self.site_id, self.date)
    }
}

// ==========================================
// Dataset - 一次运行的输入快照
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub site_master: SiteMaster,
    pub records: Vec<SiteDayRecord>,
}

impl Dataset {
    pub fn new(site_master: SiteMaster, records: Vec<SiteDayRecord>) -> Self {
        Self {
            site_master,
            records,
        }
    }

    /// 按站点与日期范围筛选 (sites 为空表示全部站点)
    pub fn filtered(
        &self,
        sites: &[String],
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Dataset {
        let records = self
            .records
            .iter()
            .filter(|r| sites.is_empty() || sites.iter().any(|s| s == &r.site_id))
            .filter(|r| date_from.map_or(true, |from| r.date >= from))
            .filter(|r| date_to.map_or(true, |to| r.date <= to))
            .cloned()
            .collect();

        Dataset {
            site_master: self.site_master.clone(),
            records,
        }
    }

    /// 数据集中出现的站点ID (去重, 升序)
    pub fn site_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.iter().map(|r| r.site_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// 日期范围 (最早, 最晚)
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }
}
