// ==========================================
// 站点资源运营分析 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 类别: LoadError (加载失败即中止, 不产出任何汇总)
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 结构校验错误 =====
    #[error("{file} 缺少必需列: {}", columns.join(", "))]
    MissingColumns { file: String, columns: Vec<String> },

    #[error("{0} 没有数据行")]
    EmptyDataset(String),

    // ===== 数据映射错误 =====
    #[error("必填值缺失 (行 {row}, 字段 {field})")]
    MissingValue { row: usize, field: String },

    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    #[error("日期格式错误 (行 {row}, 字段 {field}): 期望 YYYY-MM-DD，实际 {value}")]
    DateFormatError {
        row: usize,
        field: String,
        value: String,
    },

    #[error("站点主数据重复 (行 {row}): {site_id}")]
    DuplicateSite { row: usize, site_id: String },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 受影响的标识 (文件 / 行 / 列 / 站点)
    pub fn affected_ids(&self) -> Vec<String> {
        match self {
            ImportError::FileNotFound(path)
            | ImportError::FileReadError(path)
            | ImportError::EmptyDataset(path) => vec![path.clone()],
            ImportError::UnsupportedFormat(ext) => vec![ext.clone()],
            ImportError::MissingColumns { columns, .. } => columns.clone(),
            ImportError::MissingValue { row, field }
            | ImportError::TypeConversionError { row, field, .. }
            | ImportError::DateFormatError { row, field, .. } => {
                vec![format!("row {}", row), field.clone()]
            }
            ImportError::DuplicateSite { row, site_id } => {
                vec![format!("row {}", row), site_id.clone()]
            }
            ImportError::ExcelParseError(_)
            | ImportError::CsvParseError(_)
            | ImportError::Other(_) => Vec::new(),
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
