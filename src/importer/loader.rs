// ==========================================
// 站点资源运营分析 - 记录加载器
// ==========================================
// 流程: 文件解析 → 结构校验 → 字段映射 → Dataset
// 红线: 任一步失败即返回 LoadError, 不产出部分结果
// ==========================================

use crate::config::config_manager::{DAILY_DATA_FILE, SITE_MASTER_FILE};
use crate::domain::site::{Dataset, SiteDayRecord, SiteMaster};
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{fields, FieldMapper};
use crate::importer::file_parser::UniversalFileParser;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

pub struct RecordLoader {
    parser: UniversalFileParser,
    mapper: FieldMapper,
    validator: DqValidator,
}

impl RecordLoader {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
            mapper: FieldMapper,
            validator: DqValidator,
        }
    }

    /// 加载站点主数据
    ///
    /// # 错误
    /// - MissingColumns: 缺少 site_id 列
    /// - DuplicateSite: 同一站点出现多次
    pub fn load_site_master(&self, path: &Path) -> ImportResult<SiteMaster> {
        let table = self.parser.parse(path)?;
        self.validator
            .validate_columns(&table, &fields::SITE_MASTER_REQUIRED)?;

        let mut master = SiteMaster::new();
        for row in &table.rows {
            let attributes = self.mapper.map_site_attributes(row)?;
            let site_id = attributes.site_id.clone();
            if master.insert(attributes).is_some() {
                return Err(ImportError::DuplicateSite {
                    row: row.row_number,
                    site_id,
                });
            }
        }

        if master.is_empty() {
            warn!(path = %path.display(), "站点主数据为空");
        }

        info!(path = %path.display(), sites = master.len(), "站点主数据加载完成");
        Ok(master)
    }

    /// 加载站点日运营记录 (保持文件顺序)
    pub fn load_daily_records(&self, path: &Path) -> ImportResult<Vec<SiteDayRecord>> {
        let table = self.parser.parse(path)?;
        self.validator.validate_columns(&table, &fields::DAILY_REQUIRED)?;
        self.validator.validate_not_empty(&table)?;

        let records = table
            .rows
            .iter()
            .map(|row| self.mapper.map_site_day(row))
            .collect::<ImportResult<Vec<_>>>()?;

        let duplicates = self.validator.duplicate_record_keys(&records);
        if !duplicates.is_empty() {
            warn!(count = duplicates.len(), keys = ?duplicates, "存在重复的站点日记录");
        }

        info!(path = %path.display(), records = records.len(), "日运营记录加载完成");
        Ok(records)
    }

    /// 加载完整数据集
    pub fn load_dataset(&self, site_master_path: &Path, daily_path: &Path) -> ImportResult<Dataset> {
        let site_master = self.load_site_master(site_master_path)?;
        let records = self.load_daily_records(daily_path)?;

        let unknown: BTreeSet<&str> = records
            .iter()
            .map(|r| r.site_id.as_str())
            .filter(|id| !site_master.contains(id))
            .collect();
        if !unknown.is_empty() {
            warn!(sites = ?unknown, "日运营记录中存在主数据未登记的站点");
        }

        Ok(Dataset::new(site_master, records))
    }

    /// 从数据目录加载 (site_master.csv + daily_site_resource.csv)
    pub fn load_from_dir(&self, dir: &Path) -> ImportResult<Dataset> {
        self.load_dataset(&dir.join(SITE_MASTER_FILE), &dir.join(DAILY_DATA_FILE))
    }
}

impl Default for RecordLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_dir(master: &str, daily: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SITE_MASTER_FILE), master).unwrap();
        fs::write(dir.path().join(DAILY_DATA_FILE), daily).unwrap();
        dir
    }

    const DAILY_HEADER: &str = "date,site_id,planned_units,actual_units,usable_units,disposed_units,unit_cost,loss_reason,staffing_shortfall_flag,supplier_delay_flag,temp_excursion_flag";

    #[test]
    fn test_load_from_dir() {
        let dir = write_dir(
            "site_id,site_type,capacity_units,operating_days_per_week,is_structurally_high_loss\nS001,warehouse,4000,6,False\n",
            &format!(
                "{}\n2025-01-01,S001,100,60,50,10,5.0,spoilage,0,0,1\n2025-01-02,S009,80,80,78,2,1.5,damage,0,0,0\n",
                DAILY_HEADER
            ),
        );

        let dataset = RecordLoader::new().load_from_dir(dir.path()).unwrap();
        assert_eq!(dataset.site_master.len(), 1);
        assert_eq!(dataset.records.len(), 2);
        assert!(dataset.records[0].temp_excursion);
        assert_eq!(dataset.records[1].site_id, "S009");
    }

    #[test]
    fn test_missing_columns() {
        let dir = write_dir("site_id\nS001\n", "date,site_id,planned_units\n2025-01-01,S001,100\n");
        match RecordLoader::new().load_from_dir(dir.path()) {
            Err(ImportError::MissingColumns { columns, .. }) => {
                assert!(columns.contains(&"unit_cost".to_string()));
            }
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_daily_file() {
        let dir = write_dir("site_id\nS001\n", &format!("{}\n", DAILY_HEADER));
        assert!(matches!(
            RecordLoader::new().load_from_dir(dir.path()),
            Err(ImportError::EmptyDataset(_))
        ));
    }

    #[test]
    fn test_duplicate_site() {
        let dir = write_dir(
            "site_id\nS001\nS001\n",
            &format!("{}\n2025-01-01,S001,100,60,50,10,5.0,spoilage,0,0,1\n", DAILY_HEADER),
        );
        assert!(matches!(
            RecordLoader::new().load_from_dir(dir.path()),
            Err(ImportError::DuplicateSite { row: 3, .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            RecordLoader::new().load_from_dir(dir.path()),
            Err(ImportError::FileNotFound(_))
        ));
    }
}
