// ==========================================
// 站点资源运营分析 - 字段映射器实现
// ==========================================
// 职责: 源字段 → 标准字段映射 + 类型转换
// 别名: 兼容历史导出的列名 (planned_resource / planned_units 等)
// ==========================================

use crate::domain::site::{SiteAttributes, SiteDayRecord};
use crate::domain::types::LossDriver;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use chrono::NaiveDate;

// ==========================================
// 标准字段名
// ==========================================
pub mod fields {
    pub const SITE_ID: &str = "site_id";
    pub const DATE: &str = "date";
    pub const PLANNED_UNITS: &str = "planned_units";
    pub const ACTUAL_UNITS: &str = "actual_units";
    pub const USABLE_UNITS: &str = "usable_units";
    pub const DISPOSED_UNITS: &str = "disposed_units";
    pub const UNIT_COST: &str = "unit_cost";
    pub const LOSS_REASON: &str = "loss_reason";
    pub const STAFFING_SHORTFALL: &str = "staffing_shortfall_flag";
    pub const SUPPLIER_DELAY: &str = "supplier_delay_flag";
    pub const TEMP_EXCURSION: &str = "temp_excursion_flag";

    pub const SITE_TYPE: &str = "site_type";
    pub const CAPACITY_UNITS: &str = "capacity_units";
    pub const OPERATING_DAYS: &str = "operating_days_per_week";
    pub const STRUCTURALLY_HIGH_LOSS: &str = "is_structurally_high_loss";

    /// 日运营记录必需列
    pub const DAILY_REQUIRED: [&str; 6] = [
        SITE_ID,
        DATE,
        PLANNED_UNITS,
        ACTUAL_UNITS,
        DISPOSED_UNITS,
        UNIT_COST,
    ];

    /// 站点主数据必需列
    pub const SITE_MASTER_REQUIRED: [&str; 1] = [SITE_ID];
}

/// 标准字段的可接受列名
pub fn aliases(key: &str) -> &'static [&'static str] {
    match key {
        fields::SITE_ID => &["site_id", "site", "site_code"],
        fields::DATE => &["date", "business_date", "day"],
        fields::PLANNED_UNITS => &["planned_units", "planned_resource", "planned"],
        fields::ACTUAL_UNITS => &["actual_units", "actual_utilized", "actual"],
        fields::USABLE_UNITS => &["usable_units", "usable"],
        fields::DISPOSED_UNITS => &["disposed_units", "units_lost", "disposed"],
        fields::UNIT_COST => &["unit_cost", "cost_per_unit"],
        fields::LOSS_REASON => &["loss_reason", "reason"],
        fields::STAFFING_SHORTFALL => &["staffing_shortfall_flag", "staffing_shortfall"],
        fields::SUPPLIER_DELAY => &["supplier_delay_flag", "supplier_delay"],
        fields::TEMP_EXCURSION => &["temp_excursion_flag", "temp_excursion"],
        fields::SITE_TYPE => &["site_type", "type"],
        fields::CAPACITY_UNITS => &["capacity_units", "capacity"],
        fields::OPERATING_DAYS => &["operating_days_per_week", "operating_days"],
        fields::STRUCTURALLY_HIGH_LOSS => &["is_structurally_high_loss", "structurally_high_loss"],
        _ => &[],
    }
}

/// 表头中是否存在某标准字段 (含别名)
pub fn has_column(headers: &[String], key: &str) -> bool {
    let candidates = aliases(key);
    headers
        .iter()
        .any(|h| candidates.iter().any(|a| h.eq_ignore_ascii_case(a)) || h.eq_ignore_ascii_case(key))
}

pub struct FieldMapper;

impl FieldMapper {
    /// 原始行 → 站点日运营记录
    pub fn map_site_day(&self, row: &RawRow) -> ImportResult<SiteDayRecord> {
        let n = row.row_number;

        Ok(SiteDayRecord {
            site_id: self.require_string(row, fields::SITE_ID)?,
            date: self.parse_date(row, fields::DATE)?,

            planned_units: self.require_f64(row, fields::PLANNED_UNITS)?,
            actual_units: self.require_f64(row, fields::ACTUAL_UNITS)?,
            disposed_units: self.require_f64(row, fields::DISPOSED_UNITS)?,
            unit_cost: self.require_f64(row, fields::UNIT_COST)?,

            usable_units: self.parse_f64(row, fields::USABLE_UNITS)?,
            loss_reason: self.parse_loss_reason(row)?,

            staffing_shortfall: self.parse_bool(row, fields::STAFFING_SHORTFALL)?.unwrap_or(false),
            supplier_delay: self.parse_bool(row, fields::SUPPLIER_DELAY)?.unwrap_or(false),
            temp_excursion: self.parse_bool(row, fields::TEMP_EXCURSION)?.unwrap_or(false),

            row_number: n,
        })
    }

    /// 原始行 → 站点属性
    pub fn map_site_attributes(&self, row: &RawRow) -> ImportResult<SiteAttributes> {
        Ok(SiteAttributes {
            site_id: self.require_string(row, fields::SITE_ID)?,
            site_type: self.get_string(row, fields::SITE_TYPE),
            capacity_units: self.parse_f64(row, fields::CAPACITY_UNITS)?,
            operating_days_per_week: self.parse_u32(row, fields::OPERATING_DAYS)?,
            is_structurally_high_loss: self.parse_bool(row, fields::STRUCTURALLY_HIGH_LOSS)?,
        })
    }

    // ==========================================
    // 取值与解析
    // ==========================================

    /// 提取字符串字段（空值视为 None），支持别名
    fn get_string(&self, row: &RawRow, key: &str) -> Option<String> {
        std::iter::once(key)
            .chain(aliases(key).iter().copied())
            .find_map(|alias| {
                row.values
                    .iter()
                    .find(|(h, _)| h.eq_ignore_ascii_case(alias))
                    .map(|(_, v)| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            })
    }

    fn require_string(&self, row: &RawRow, key: &str) -> ImportResult<String> {
        self.get_string(row, key).ok_or_else(|| ImportError::MissingValue {
            row: row.row_number,
            field: key.to_string(),
        })
    }

    /// 解析浮点数
    fn parse_f64(&self, row: &RawRow, key: &str) -> ImportResult<Option<f64>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => value
                .replace(',', "")
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| ImportError::TypeConversionError {
                    row: row.row_number,
                    field: key.to_string(),
                    message: format!("无法解析为数值: {}", value),
                }),
        }
    }

    fn require_f64(&self, row: &RawRow, key: &str) -> ImportResult<f64> {
        self.parse_f64(row, key)?.ok_or_else(|| ImportError::MissingValue {
            row: row.row_number,
            field: key.to_string(),
        })
    }

    /// 解析非负整数 (兼容 "5.0" 形式)
    fn parse_u32(&self, row: &RawRow, key: &str) -> ImportResult<Option<u32>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => value
                .parse::<u32>()
                .ok()
                .or_else(|| {
                    value
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64)
                        .map(|v| v as u32)
                })
                .map(Some)
                .ok_or_else(|| ImportError::TypeConversionError {
                    row: row.row_number,
                    field: key.to_string(),
                    message: format!("无法解析为整数: {}", value),
                }),
        }
    }

    /// 解析布尔标记 (1/0, true/false, yes/no, y/n)
    fn parse_bool(&self, row: &RawRow, key: &str) -> ImportResult<Option<bool>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "1.0" | "true" | "yes" | "y" => Ok(Some(true)),
                "0" | "0.0" | "false" | "no" | "n" => Ok(Some(false)),
                _ => Err(ImportError::TypeConversionError {
                    row: row.row_number,
                    field: key.to_string(),
                    message: format!("无法解析为布尔值: {}", value),
                }),
            },
        }
    }

    /// 解析日期（YYYY-MM-DD, 兼容 YYYYMMDD）
    fn parse_date(&self, row: &RawRow, key: &str) -> ImportResult<NaiveDate> {
        let value = self.require_string(row, key)?;
        NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(&value, "%Y%m%d"))
            .map_err(|_| ImportError::DateFormatError {
                row: row.row_number,
                field: key.to_string(),
                value: value.clone(),
            })
    }

    /// 解析损耗原因 (空值 / none / unknown → None)
    fn parse_loss_reason(&self, row: &RawRow) -> ImportResult<Option<LossDriver>> {
        match self.get_string(row, fields::LOSS_REASON) {
            None => Ok(None),
            Some(value) if matches!(value.to_lowercase().as_str(), "none" | "unknown" | "n/a") => {
                Ok(None)
            }
            Some(value) => LossDriver::from_code(&value).map(Some).ok_or_else(|| {
                ImportError::TypeConversionError {
                    row: row.row_number,
                    field: fields::LOSS_REASON.to_string(),
                    message: format!("未知的损耗原因: {}", value),
                }
            }),
        }
    }
}
