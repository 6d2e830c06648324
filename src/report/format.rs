// ==========================================
// 站点资源运营分析 - 数值格式化
// ==========================================
// 报告与控制台共用; 输出确定 (同值同文本)
// ==========================================

use crate::domain::kpi::RateValue;

/// 千分位分组
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 整数 (四舍五入, 千分位)
pub fn fmt_int(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(&format!("{:.0}", rounded.abs())))
}

/// 金额 ($1,234.56)
pub fn fmt_money(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}${}.{}", sign, group_thousands(whole), frac)
}

/// 百分比 (两位小数, 未定义显示 n/a)
pub fn fmt_rate(rate: RateValue) -> String {
    match rate {
        RateValue::Defined(v) => fmt_pct(v, 2),
        RateValue::Undefined => "n/a".to_string(),
    }
}

pub fn fmt_pct(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}
