// ==========================================
// 站点资源运营分析 - 导入层
// ==========================================
// 职责: 读取站点主数据与日运营记录 (CSV / Excel)
// 流程: 文件解析 → 结构校验 → 字段映射
// ==========================================

pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod loader;

// 重导出
pub use dq_validator::DqValidator;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, RawTable, UniversalFileParser};
pub use loader::RecordLoader;
