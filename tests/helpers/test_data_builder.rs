// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveDate;
use site_resource_ops::config::config_manager::{DAILY_DATA_FILE, SITE_MASTER_FILE};
use site_resource_ops::domain::site::{Dataset, SiteAttributes, SiteDayRecord, SiteMaster};
use site_resource_ops::domain::types::LossDriver;
use std::fs;
use std::path::Path;

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

// ==========================================
// SiteDayRecord 构建器
// ==========================================

pub struct SiteDayRecordBuilder {
    record: SiteDayRecord,
}

impl SiteDayRecordBuilder {
    /// 默认: 计划 100 / 实际 95 / 损耗 2 / 单价 1.0 (Normal)
    pub fn new(site_id: &str, day: u32) -> Self {
        Self {
            record: SiteDayRecord {
                site_id: site_id.to_string(),
                date: date(day),
                planned_units: 100.0,
                actual_units: 95.0,
                disposed_units: 2.0,
                unit_cost: 1.0,
                usable_units: None,
                loss_reason: None,
                staffing_shortfall: false,
                supplier_delay: false,
                temp_excursion: false,
                row_number: 0,
            },
        }
    }

    pub fn planned(mut self, units: f64) -> Self {
        self.record.planned_units = units;
        self
    }

    pub fn actual(mut self, units: f64) -> Self {
        self.record.actual_units = units;
        self
    }

    pub fn disposed(mut self, units: f64) -> Self {
        self.record.disposed_units = units;
        self
    }

    pub fn unit_cost(mut self, cost: f64) -> Self {
        self.record.unit_cost = cost;
        self
    }

    pub fn usable(mut self, units: f64) -> Self {
        self.record.usable_units = Some(units);
        self
    }

    pub fn reason(mut self, driver: LossDriver) -> Self {
        self.record.loss_reason = Some(driver);
        self
    }

    pub fn temp_excursion(mut self) -> Self {
        self.record.temp_excursion = true;
        self
    }

    pub fn build(self) -> SiteDayRecord {
        self.record
    }
}

/// 由记录构造数据集 (站点主数据仅含站点ID)
pub fn dataset(records: Vec<SiteDayRecord>) -> Dataset {
    let mut master = SiteMaster::new();
    for record in &records {
        if !master.contains(&record.site_id) {
            master.insert(SiteAttributes::bare(&record.site_id));
        }
    }
    Dataset::new(master, records)
}

// ==========================================
// CSV 夹具
// ==========================================

pub const DAILY_HEADER: &str = "date,site_id,planned_units,actual_units,usable_units,disposed_units,unit_cost,loss_reason,staffing_shortfall_flag,supplier_delay_flag,temp_excursion_flag";

pub const SITE_MASTER_CSV: &str = "site_id,site_type,capacity_units,operating_days_per_week,is_structurally_high_loss
S1,facility,4000,6,False
S2,warehouse,3000,5,False
S3,service_site,5000,7,True
";

/// 三站点 × 三天的标准日运营数据
/// (含一条 planned=0 记录, 一条 actual > planned 的 Watch 记录)
pub fn daily_csv() -> String {
    let rows = [
        "2025-01-01,S1,100,60,50,10,5.0,spoilage,0,0,1",
        "2025-01-02,S1,100,95,93,2,5.0,damage,0,0,0",
        "2025-01-03,S1,100,96,94,2,5.0,overproduction,0,0,0",
        "2025-01-01,S2,0,0,0,5,10.0,timing_mismatch,0,1,0",
        "2025-01-02,S2,200,190,160,30,100.0,spoilage,1,0,0",
        "2025-01-03,S2,200,195,190,5,100.0,damage,0,0,0",
        "2025-01-01,S3,150,170,161,9,50.0,overproduction,0,0,0",
        "2025-01-02,S3,150,150,146,4,50.0,damage,0,0,0",
        "2025-01-03,S3,150,140,138,2,50.0,timing_mismatch,0,0,0",
    ];
    format!("{}\n{}\n", DAILY_HEADER, rows.join("\n"))
}

/// 写出数据目录
pub fn write_data_dir(dir: &Path, site_master: &str, daily: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(SITE_MASTER_FILE), site_master).unwrap();
    fs::write(dir.join(DAILY_DATA_FILE), daily).unwrap();
}
