// ==========================================
// 测试数据生成器
// ==========================================
// 用途: 生成合成的站点主数据 + 站点日运营记录
// 输出: <output-dir>/site_master.csv, <output-dir>/daily_site_resource.csv
// 可复现: 相同 seed 产出相同文件
// ==========================================

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use clap::Parser;
use csv::Writer;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::BTreeSet;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

const SITE_TYPES: [&str; 3] = ["facility", "warehouse", "service_site"];
const LOSS_REASONS: [&str; 4] = ["overproduction", "spoilage", "damage", "timing_mismatch"];

/// 站点日运营合成数据生成器
#[derive(Parser, Debug)]
#[command(name = "generate_test_data")]
#[command(about = "Generate synthetic site/day resource data")]
struct Args {
    /// 随机种子
    #[arg(long, default_value = "42")]
    seed: u64,

    /// 站点数
    #[arg(long, default_value = "12")]
    sites: usize,

    /// 起始日期 (含)
    #[arg(long, default_value = "2025-01-01")]
    start: NaiveDate,

    /// 截止日期 (含)
    #[arg(long, default_value = "2025-03-31")]
    end: NaiveDate,

    /// 结构性高损耗站点占比
    #[arg(long, default_value = "0.25")]
    bad_site_fraction: f64,

    /// 输出目录
    #[arg(long, default_value = "data/raw")]
    output_dir: PathBuf,
}

struct Site {
    site_id: String,
    capacity_units: i64,
    is_bad: bool,
}

/// 标准正态分布采样 (Box-Muller)
fn sample_normal(rng: &mut StdRng, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos() * std_dev
}

/// 按权重选择损耗原因
fn pick_reason(rng: &mut StdRng, weights: [f64; 4]) -> &'static str {
    let total: f64 = weights.iter().sum();
    let mut roll = rng.gen_range(0.0..total);
    for (reason, w) in LOSS_REASONS.iter().zip(weights) {
        if roll < w {
            return *reason;
        }
        roll -= w;
    }
    LOSS_REASONS[LOSS_REASONS.len() - 1]
}

fn write_site_master(args: &Args, rng: &mut StdRng) -> Result<Vec<Site>, Box<dyn Error>> {
    let site_ids: Vec<String> = (1..=args.sites).map(|i| format!("S{:03}", i)).collect();

    let n_bad = ((args.sites as f64 * args.bad_site_fraction).round() as usize).max(1);
    let bad: BTreeSet<String> = site_ids
        .choose_multiple(rng, n_bad.min(site_ids.len()))
        .cloned()
        .collect();

    let path = args.output_dir.join("site_master.csv");
    let mut writer = Writer::from_path(&path)?;
    writer.write_record([
        "site_id",
        "site_type",
        "capacity_units",
        "operating_days_per_week",
        "is_structurally_high_loss",
    ])?;

    let mut sites = Vec::with_capacity(site_ids.len());
    for site_id in site_ids {
        let site_type = SITE_TYPES[rng.gen_range(0..SITE_TYPES.len())];
        let capacity_units: i64 = rng.gen_range(2500..6500);
        let operating_days: u32 = rng.gen_range(5..=7);
        let is_bad = bad.contains(&site_id);

        writer.write_record([
            site_id.clone(),
            site_type.to_string(),
            capacity_units.to_string(),
            operating_days.to_string(),
            if is_bad { "True" } else { "False" }.to_string(),
        ])?;

        sites.push(Site {
            site_id,
            capacity_units,
            is_bad,
        });
    }
    writer.flush()?;
    println!("Wrote: {}", path.display());
    Ok(sites)
}

fn write_daily(args: &Args, sites: &[Site], rng: &mut StdRng) -> Result<usize, Box<dyn Error>> {
    let path = args.output_dir.join("daily_site_resource.csv");
    let mut writer = Writer::from_path(&path)?;
    writer.write_record([
        "date",
        "site_id",
        "planned_units",
        "actual_units",
        "usable_units",
        "disposed_units",
        "unit_cost",
        "loss_reason",
        "staffing_shortfall_flag",
        "supplier_delay_flag",
        "temp_excursion_flag",
    ])?;

    let mut rows = 0;
    for site in sites {
        let base_plan: i64 = rng.gen_range(800..=2200);
        let unit_cost: f64 = rng.gen_range(2.25..12.50);
        let base_loss_rate: f64 = if site.is_bad {
            rng.gen_range(0.08..0.16)
        } else {
            rng.gen_range(0.02..0.06)
        };

        let mut date = args.start;
        while date <= args.end {
            let staffing = rng.gen_bool(0.08);
            let supplier = rng.gen_bool(0.06);
            let temp = rng.gen_bool(0.04);

            // 周五/周六计划量略高
            let weekday_factor = match date.weekday() {
                Weekday::Fri | Weekday::Sat => 1.06,
                _ => 1.0,
            };
            let planned = (base_plan as f64 * weekday_factor).round() as i64;

            let mut variance = sample_normal(rng, 0.06);
            if supplier {
                variance -= rng.gen_range(0.05..0.12);
            }
            let actual = ((planned as f64 * (1.0 + variance)).round() as i64)
                .clamp(0, site.capacity_units);

            let mut loss_rate = base_loss_rate;
            if staffing {
                loss_rate += rng.gen_range(0.01..0.03);
            }
            if temp {
                loss_rate += rng.gen_range(0.02..0.05);
            }
            if supplier {
                loss_rate += rng.gen_range(0.005..0.02);
            }
            let loss_rate = loss_rate.clamp(0.0, 0.35);

            let disposed = ((actual as f64 * loss_rate).round() as i64).min(actual);
            let usable = actual - disposed;

            let weights = if temp {
                [0.25, 0.50, 0.15, 0.10]
            } else if staffing {
                [0.30, 0.20, 0.20, 0.30]
            } else if supplier {
                [0.25, 0.20, 0.15, 0.40]
            } else {
                [0.40, 0.20, 0.20, 0.20]
            };
            let reason = pick_reason(rng, weights);

            writer.write_record([
                date.to_string(),
                site.site_id.clone(),
                planned.to_string(),
                actual.to_string(),
                usable.to_string(),
                disposed.to_string(),
                format!("{:.2}", unit_cost),
                reason.to_string(),
                u8::from(staffing).to_string(),
                u8::from(supplier).to_string(),
                u8::from(temp).to_string(),
            ])?;

            rows += 1;
            date += Duration::days(1);
        }
    }
    writer.flush()?;
    println!("Wrote: {}", path.display());
    Ok(rows)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    if args.start > args.end {
        return Err(format!("start {} is after end {}", args.start, args.end).into());
    }

    fs::create_dir_all(&args.output_dir)?;
    let mut rng = StdRng::seed_from_u64(args.seed);

    let sites = write_site_master(&args, &mut rng)?;
    let rows = write_daily(&args, &sites, &mut rng)?;

    println!(
        "Rows: {} | Sites: {} | Dates: {} -> {}",
        rows,
        sites.len(),
        args.start,
        args.end
    );
    Ok(())
}
