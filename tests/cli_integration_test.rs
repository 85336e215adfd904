//! CLI orchestration tests.
//!
//! Tests cover:
//! - Config loading and validation from INI files on disk
//! - Screener parameter overrides
//! - Score and screen reports over a mock data port
//! - Full command runs against CSV files in a temporary directory

mod common;

use clap::Parser;
use common::*;
use marketlens::cli::{self, Cli};
use marketlens::domain::error::MarketLensError;
use marketlens::domain::fundamental::{FinancialFacts, MonthlyRevenue, QuarterlyFinancials};
use marketlens::domain::score::ScoringWeights;
use marketlens::domain::screener::{MAX_RESULTS, ScreenParams, ScreenStrategy};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn succeeded(code: ExitCode) -> bool {
    format!("{:?}", code) == format!("{:?}", ExitCode::SUCCESS)
}

fn write_price_csv(dir: &Path, code: &str, closes: &[f64], last_volume: i64) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for (i, c) in closes.iter().enumerate() {
        let volume = if i + 1 == closes.len() { last_volume } else { 1000 };
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            day(i),
            c,
            c + 0.5,
            c - 0.5,
            c,
            volume
        ));
    }
    fs::write(dir.join(format!("{}.csv", code)), content).unwrap();
}

const VALID_INI: &str = r#"
[data]
path = ./data

[scoring]
rsi_weight = 20
ma_weight = 20
macd_weight = 15
kd_weight = 15
volume_weight = 10
adx_weight = 10
bollinger_weight = 10

[screener]
rsi_threshold = 30
volume_multiple = 2.0
limit = 25
"#;

mod config_loading {
    use super::*;

    #[test]
    fn load_config_validates() {
        let file = write_temp_ini(VALID_INI);
        assert!(cli::load_config(file.path()).is_ok());
    }

    #[test]
    fn load_config_rejects_missing_data_path() {
        let file = write_temp_ini("[scoring]\nrsi_weight = 20\n");
        let err = cli::load_config(file.path()).unwrap_err();
        assert!(matches!(err, MarketLensError::ConfigMissing { section, .. } if section == "data"));
    }

    #[test]
    fn load_config_missing_file() {
        let err = cli::load_config(Path::new("/nonexistent/marketlens.ini")).unwrap_err();
        assert!(matches!(err, MarketLensError::ConfigParse { .. }));
    }

    #[test]
    fn screen_params_overrides() {
        let file = write_temp_ini(VALID_INI);
        let config = cli::load_config(file.path()).unwrap();

        let params = cli::resolve_screen_params(&config, None, None).unwrap();
        assert_eq!(params.limit, 25);

        let params = cli::resolve_screen_params(&config, Some(20.0), Some(5)).unwrap();
        assert_eq!(params.rsi_threshold, 20.0);
        assert_eq!(params.limit, 5);

        let err = cli::resolve_screen_params(&config, Some(120.0), None).unwrap_err();
        assert!(matches!(err, MarketLensError::ConfigInvalid { .. }));
    }
}

mod reports {
    use super::*;

    fn facts() -> FinancialFacts {
        let quarters = (1..=4)
            .map(|q| QuarterlyFinancials {
                year: 2024,
                quarter: q,
                revenue: 100.0,
                gross_profit: 40.0,
                operating_income: 20.0,
                net_income: 10.0,
                eps: 2.0,
                total_assets: None,
                total_equity: None,
                operating_cash_flow: None,
            })
            .collect();
        FinancialFacts {
            quarters,
            monthly_revenue: vec![
                MonthlyRevenue::new(2023, 12, 100.0),
                MonthlyRevenue::new(2024, 12, 105.0),
            ],
            dividends: vec![],
        }
        .normalized()
    }

    #[test]
    fn score_report_combines_when_fundamentals_exist() {
        let port = MockDataPort::new()
            .with_bars("AAA", ranged_bars("AAA", &constant_closes(30, 100.0)))
            .with_financials("AAA", facts());
        let report = cli::build_score_report(&port, "AAA", &ScoringWeights::default()).unwrap();

        // eps ttm 8 => +10, pe 12.5 => +5, revenue yoy 5% => +5
        let fundamental = report.fundamental.as_ref().unwrap();
        assert_eq!(fundamental.value, 70);
        assert!(fundamental.adjustment("dividend_yield").is_none());
        assert!(fundamental.adjustment("eps_ttm_yoy").is_none());

        let expected =
            ((report.technical.value as f64 + fundamental.value as f64) / 2.0).round() as u8;
        assert_eq!(report.combined, Some(expected));
    }

    #[test]
    fn score_report_without_fundamentals() {
        let port = MockDataPort::new()
            .with_bars("AAA", ranged_bars("AAA", &constant_closes(30, 100.0)));
        let report = cli::build_score_report(&port, "AAA", &ScoringWeights::default()).unwrap();
        assert!(report.fundamental.is_none());
        assert_eq!(report.combined, Some(report.technical.value));
    }

    #[test]
    fn score_report_short_history_fails() {
        let port = MockDataPort::new()
            .with_bars("AAA", ranged_bars("AAA", &constant_closes(10, 100.0)));
        let err = cli::build_score_report(&port, "AAA", &ScoringWeights::default()).unwrap_err();
        assert!(matches!(err, MarketLensError::InsufficientHistory { .. }));
    }

    #[test]
    fn screen_report_unknown_strategy() {
        let port = MockDataPort::new();
        let err = cli::build_screen_report(&port, &[], "to_the_moon", &ScreenParams::default())
            .unwrap_err();
        assert!(matches!(err, MarketLensError::UnknownStrategy { .. }));
    }

    #[test]
    fn screen_report_lists_skips() {
        let port = MockDataPort::new()
            .with_bars("AAA", volume_spike_bars("AAA", 5000))
            .with_bars("BBB", volume_spike_bars("BBB", 5000)[..10].to_vec());
        let codes = vec!["AAA".to_string(), "BBB".to_string()];
        let report =
            cli::build_screen_report(&port, &codes, "volume_breakout", &ScreenParams::default())
                .unwrap();
        assert_eq!(report.strategy, ScreenStrategy::VolumeBreakout);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.skipped, vec!["BBB (only 10 bars)".to_string()]);
    }

    #[test]
    fn format_record_marks_absent_values() {
        let bars = ranged_bars("AAA", &constant_closes(20, 100.0));
        let record = marketlens::domain::engine::compute_latest("AAA", &bars).unwrap();
        let text = cli::format_record(&record);
        assert!(text.contains("MA60         n/a"));
        assert!(text.contains("MA20         100.00"));
    }
}

mod commands {
    use super::*;

    fn setup() -> (TempDir, tempfile::NamedTempFile) {
        let dir = TempDir::new().unwrap();
        write_price_csv(dir.path(), "AAA", &constant_closes(30, 100.0), 5000);
        write_price_csv(dir.path(), "BBB", &rising_closes(30, 50.0, 80.0), 1000);
        write_price_csv(dir.path(), "CCC", &constant_closes(5, 10.0), 1000);
        let ini = write_temp_ini(&format!("[data]\npath = {}\n", dir.path().display()));
        (dir, ini)
    }

    fn run(args: &[&str]) -> ExitCode {
        cli::run(Cli::parse_from(args))
    }

    #[test]
    fn validate_command_succeeds() {
        let (_dir, ini) = setup();
        let config = ini.path().to_str().unwrap();
        assert!(succeeded(run(&["marketlens", "validate", "-c", config])));
    }

    #[test]
    fn indicators_and_signals_commands() {
        let (_dir, ini) = setup();
        let config = ini.path().to_str().unwrap();
        assert!(succeeded(run(&[
            "marketlens", "indicators", "-c", config, "--code", "bbb", "--history", "3",
        ])));
        assert!(succeeded(run(&[
            "marketlens", "signals", "-c", config, "--code", "AAA", "--json",
        ])));
        assert!(succeeded(run(&["marketlens", "score", "-c", config, "--code", "AAA"])));
    }

    #[test]
    fn short_history_is_an_error_exit() {
        let (_dir, ini) = setup();
        let config = ini.path().to_str().unwrap();
        assert!(!succeeded(run(&[
            "marketlens", "indicators", "-c", config, "--code", "CCC",
        ])));
    }

    #[test]
    fn screen_command_over_all_symbols() {
        let (_dir, ini) = setup();
        let config = ini.path().to_str().unwrap();
        assert!(succeeded(run(&[
            "marketlens", "screen", "-c", config, "-s", "volume_breakout", "--limit", "10",
        ])));
        assert!(!succeeded(run(&[
            "marketlens", "screen", "-c", config, "-s", "bogus",
        ])));
    }

    #[test]
    fn list_symbols_command() {
        let (_dir, ini) = setup();
        let config = ini.path().to_str().unwrap();
        assert!(succeeded(run(&["marketlens", "list-symbols", "-c", config])));
    }

    #[test]
    fn limit_never_exceeds_cap() {
        let (_dir, ini) = setup();
        let config = cli::load_config(ini.path()).unwrap();
        let params = cli::resolve_screen_params(&config, None, Some(500)).unwrap();
        let port = MockDataPort::new();
        let report = cli::build_screen_report(&port, &[], "rsi_oversold", &params).unwrap();
        assert!(report.matches.len() <= MAX_RESULTS);
    }
}
