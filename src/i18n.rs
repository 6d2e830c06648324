// ==========================================
// 国际化 (i18n)
// ==========================================
// 基于 rust-i18n, 语言文件见 locales/*.yml
// 覆盖: 风险分级名称 / 损耗驱动名称 / 默认建议动作 / 报告标题与表头
// 注意: rust_i18n::i18n! 宏在 lib.rs 中初始化, locale 为进程级全局状态
// ==========================================

/// 支持的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "zh-CN"];

/// 是否为支持的语言
pub fn is_supported(locale: &str) -> bool {
    SUPPORTED_LOCALES.contains(&locale)
}

/// 当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 切换语言
///
/// 建议动作文本在 `ActionTable::from_locale` 时取值,
/// 需在构造编排器之前调用。
pub fn set_locale(locale: &str) {
    if !is_supported(locale) {
        tracing::warn!(locale, "不支持的语言, 回退为 en");
    }
    rust_i18n::set_locale(locale);
}

/// 翻译
///
/// # 示例
/// ```no_run
/// use site_resource_ops::i18n::t;
/// let heading = t("report.exec_summary");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译并替换 `%{name}` 占位符
///
/// # 示例
/// ```no_run
/// use site_resource_ops::i18n::t_with_args;
/// let line = t_with_args("report.window", &[("start", "2025-01-01"), ("end", "2025-03-31")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter()
        .fold(t(key), |text, (name, value)| {
            text.replace(&format!("%{{{}}}", name), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // locale 为全局状态, 切换语言的测试需串行
    static LOCALE_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_supported_locales() {
        assert!(is_supported("en"));
        assert!(is_supported("zh-CN"));
        assert!(!is_supported("fr"));
    }

    #[test]
    fn test_switch_locale() {
        let _guard = LOCALE_LOCK.lock().unwrap();

        set_locale("zh-CN");
        assert_eq!(current_locale(), "zh-CN");
        assert_eq!(t("risk.watch"), "关注");

        set_locale("en");
        assert_eq!(current_locale(), "en");
        assert_eq!(t("risk.intervention_required"), "Intervention Required");
        assert_eq!(t("driver.timing_mismatch"), "Timing Mismatch");
    }

    #[test]
    fn test_placeholders() {
        let _guard = LOCALE_LOCK.lock().unwrap();
        set_locale("en");

        let line = t_with_args("report.window", &[("start", "2025-01-01"), ("end", "2025-01-03")]);
        assert_eq!(line, "Analysis window: 2025-01-01 to 2025-01-03");

        let banner = t_with_args("report.dq_banner", &[("count", "2"), ("sites", "S2, S3")]);
        assert!(banner.contains("2 site(s): S2, S3"));
    }

    #[test]
    fn test_every_driver_has_action() {
        let _guard = LOCALE_LOCK.lock().unwrap();

        for locale in SUPPORTED_LOCALES {
            set_locale(locale);
            for code in ["overproduction", "timing_mismatch", "spoilage", "damage"] {
                let key = format!("actions.{}", code);
                assert_ne!(t(&key), key, "{} 缺少 {}", locale, key);
            }
        }
        set_locale("en");
    }
}
