// ==========================================
// 站点资源运营分析 - 结构校验器实现
// ==========================================
// 职责: 基本结构校验 (必需列 / 非空 / 重复键)
// 红线: 不做业务规则校验, 数值合理性交由 KPI 引擎标记
// ==========================================

use crate::domain::site::SiteDayRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::has_column;
use crate::importer::file_parser::RawTable;
use std::collections::BTreeSet;

pub struct DqValidator;

impl DqValidator {
    /// 校验必需列 (一次报告全部缺失列)
    pub fn validate_columns(&self, table: &RawTable, required: &[&str]) -> ImportResult<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|key| !has_column(&table.headers, key))
            .map(|key| key.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::MissingColumns {
                file: table.source.clone(),
                columns: missing,
            })
        }
    }

    /// 校验存在数据行
    pub fn validate_not_empty(&self, table: &RawTable) -> ImportResult<()> {
        if table.rows.is_empty() {
            return Err(ImportError::EmptyDataset(table.source.clone()));
        }
        Ok(())
    }

    /// 重复的 站点@日期 键 (升序)
    pub fn duplicate_record_keys(&self, records: &[SiteDayRecord]) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();

        for record in records {
            let key = record.record_key();
            if !seen.insert(key.clone()) {
                duplicates.insert(key);
            }
        }

        duplicates.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::field_mapper::fields;
    use crate::importer::file_parser::RawRow;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn table(headers: &[&str], rows: usize) -> RawTable {
        RawTable {
            source: "daily.csv".to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: (0..rows)
                .map(|i| RawRow {
                    row_number: i + 2,
                    values: HashMap::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_missing_columns_reported_together() {
        let t = table(&["site_id", "date", "planned_units"], 1);
        match DqValidator.validate_columns(&t, &fields::DAILY_REQUIRED) {
            Err(ImportError::MissingColumns { columns, .. }) => {
                assert_eq!(columns, vec!["actual_units", "disposed_units", "unit_cost"]);
            }
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_table() {
        let t = table(&["site_id"], 0);
        assert!(matches!(
            DqValidator.validate_not_empty(&t),
            Err(ImportError::EmptyDataset(_))
        ));
    }

    #[test]
    fn test_duplicate_record_keys() {
        let record = |site: &str, day: u32| SiteDayRecord {
            site_id: site.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            planned_units: 1.0,
            actual_units: 1.0,
            disposed_units: 0.0,
            unit_cost: 1.0,
            usable_units: None,
            loss_reason: None,
            staffing_shortfall: false,
            supplier_delay: false,
            temp_excursion: false,
            row_number: 2,
        };

        let keys = DqValidator.duplicate_record_keys(&[record("A", 1), record("A", 1), record("B", 1)]);
        assert_eq!(keys, vec!["A@2025-01-01"]);
    }
}
