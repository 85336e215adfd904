//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    data_path, load_scoring_weights, load_screen_params, validate_config,
};
use crate::domain::error::MarketLensError;
use crate::domain::record::IndicatorRecord;
use crate::domain::score::{
    Score, ScoringWeights, combined_score, fundamental_score, technical_score,
};
use crate::domain::screener::{ScreenMatch, ScreenParams, ScreenStrategy, screen};
use crate::domain::signal::Signal;
use crate::domain::universe::{
    SkipReason, SkippedCode, analyze_instrument, analyze_universe, parse_codes,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;

#[derive(Parser, Debug)]
#[command(name = "marketlens", about = "Technical and fundamental equity analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the latest indicator record for an instrument
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        /// Show this many trailing records instead of only the latest
        #[arg(long)]
        history: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Detect signals on the latest two records
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        #[arg(long)]
        json: bool,
    },
    /// Technical, fundamental and combined scores
    Score {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        #[arg(long)]
        json: bool,
    },
    /// Run a screening strategy across the universe
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        strategy: String,
        /// Comma-separated codes; defaults to every symbol with data
        #[arg(long)]
        codes: Option<String>,
        /// RSI threshold for rsi_oversold
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// List symbols with price data
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Indicators {
            config,
            code,
            history,
            json,
        } => run_indicators(&config, &code, history, json),
        Command::Signals { config, code, json } => run_signals(&config, &code, json),
        Command::Score { config, code, json } => run_score(&config, &code, json),
        Command::Screen {
            config,
            strategy,
            codes,
            threshold,
            limit,
            json,
        } => run_screen(&config, &strategy, codes.as_deref(), threshold, limit, json),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Loads and validates the configuration file.
pub fn load_config(path: &Path) -> Result<FileConfigAdapter, MarketLensError> {
    tracing::info!(file = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

fn open_data(config: &dyn ConfigPort) -> Result<CsvAdapter, MarketLensError> {
    Ok(CsvAdapter::new(data_path(config)?))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, MarketLensError> {
    serde_json::to_string_pretty(value).map_err(|e| MarketLensError::Data {
        reason: format!("failed to serialise output: {e}"),
    })
}

fn show(value: Option<f64>, places: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", places, v),
        None => "n/a".to_string(),
    }
}

/// Human-readable rendering of one record, absent values shown as `n/a`.
pub fn format_record(record: &IndicatorRecord) -> String {
    let r = record.rounded();
    let mut out = String::new();
    let _ = writeln!(out, "{} {}  close {:.2}  volume {}", r.code, r.date, r.close, r.volume);
    let rows: [(&str, Option<f64>, usize); 19] = [
        ("MA5", r.ma5, 2),
        ("MA10", r.ma10, 2),
        ("MA20", r.ma20, 2),
        ("MA60", r.ma60, 2),
        ("RSI14", r.rsi14, 2),
        ("MACD", r.macd_line, 4),
        ("MACD signal", r.macd_signal, 4),
        ("MACD hist", r.macd_histogram, 4),
        ("K", r.stoch_k, 2),
        ("D", r.stoch_d, 2),
        ("BB upper", r.bollinger_upper, 2),
        ("BB middle", r.bollinger_middle, 2),
        ("BB lower", r.bollinger_lower, 2),
        ("VWAP20", r.vwap20, 2),
        ("ATR14", r.atr14, 2),
        ("ADX14", r.adx14, 2),
        ("+DI14", r.plus_di14, 2),
        ("-DI14", r.minus_di14, 2),
        ("WR14", r.williams_r14, 2),
    ];
    for (label, value, places) in rows {
        let _ = writeln!(out, "  {:<12} {}", label, show(value, places));
    }
    let obv = r.obv.map_or_else(|| "n/a".to_string(), |v| v.to_string());
    let _ = writeln!(out, "  {:<12} {}", "OBV", obv);
    out
}

fn run_indicators(
    config_path: &Path,
    code: &str,
    history: Option<usize>,
    json: bool,
) -> Result<(), MarketLensError> {
    let config = load_config(config_path)?;
    let data = open_data(&config)?;
    let analysis = analyze_instrument(&data, &code.to_uppercase())?;

    let take = history.unwrap_or(1).max(1).min(analysis.history.len());
    let records: Vec<IndicatorRecord> = analysis.history[analysis.history.len() - take..]
        .iter()
        .map(IndicatorRecord::rounded)
        .collect();

    if json {
        println!("{}", to_json(&records)?);
    } else {
        for record in &records {
            print!("{}", format_record(record));
        }
    }
    Ok(())
}

fn run_signals(config_path: &Path, code: &str, json: bool) -> Result<(), MarketLensError> {
    let config = load_config(config_path)?;
    let data = open_data(&config)?;
    let signals = analyze_instrument(&data, &code.to_uppercase())?.signals();

    if json {
        println!("{}", to_json(&signals)?);
    } else if signals.is_empty() {
        eprintln!("No signals for {}", code);
    } else {
        for s in &signals {
            println!("{}", format_signal(s));
        }
    }
    Ok(())
}

pub fn format_signal(signal: &Signal) -> String {
    format!(
        "{} {} {:?}: {}",
        signal.date, signal.kind, signal.direction, signal.description
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub code: String,
    pub date: NaiveDate,
    pub technical: Score,
    pub fundamental: Option<Score>,
    pub combined: Option<u8>,
}

/// Technical score always; fundamental only when financial facts exist.
pub fn build_score_report(
    data: &dyn DataPort,
    code: &str,
    weights: &ScoringWeights,
) -> Result<ScoreReport, MarketLensError> {
    let analysis = analyze_instrument(data, code)?;
    let latest = analysis.latest().ok_or_else(|| MarketLensError::NoData {
        code: code.to_string(),
    })?;
    let technical = technical_score(latest, &analysis.price_context(), weights);

    let fundamental = data
        .fetch_financials(code)?
        .filter(|facts| !facts.is_empty())
        .map(|facts| fundamental_score(&facts, latest.close));

    let combined = combined_score(Some(&technical), fundamental.as_ref());
    Ok(ScoreReport {
        code: code.to_string(),
        date: latest.date,
        technical,
        fundamental,
        combined,
    })
}

fn format_score(label: &str, score: &Score) -> String {
    let mut out = format!("{:<12} {}\n", label, score.value);
    for a in &score.adjustments {
        let _ = writeln!(out, "  {:<16} {:+.1}", a.component, a.points);
    }
    out
}

fn run_score(config_path: &Path, code: &str, json: bool) -> Result<(), MarketLensError> {
    let config = load_config(config_path)?;
    let weights = load_scoring_weights(&config)?;
    let data = open_data(&config)?;
    let report = build_score_report(&data, &code.to_uppercase(), &weights)?;

    if json {
        println!("{}", to_json(&report)?);
        return Ok(());
    }
    println!("{} {}", report.code, report.date);
    print!("{}", format_score("technical", &report.technical));
    match &report.fundamental {
        Some(score) => print!("{}", format_score("fundamental", score)),
        None => println!("{:<12} n/a", "fundamental"),
    }
    if let Some(combined) = report.combined {
        println!("{:<12} {}", "combined", combined);
    }
    Ok(())
}

/// `[screener]` defaults with command-line overrides applied.
pub fn resolve_screen_params(
    config: &dyn ConfigPort,
    threshold: Option<f64>,
    limit: Option<usize>,
) -> Result<ScreenParams, MarketLensError> {
    let mut params = load_screen_params(config)?;
    if let Some(t) = threshold {
        if !(t > 0.0 && t < 100.0) {
            return Err(MarketLensError::ConfigInvalid {
                section: "screener".into(),
                key: "rsi_threshold".into(),
                reason: "threshold must be between 0 and 100".into(),
            });
        }
        params.rsi_threshold = t;
    }
    if let Some(l) = limit {
        params.limit = l.max(1);
    }
    Ok(params)
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreenReport {
    pub strategy: ScreenStrategy,
    pub matches: Vec<ScreenMatch>,
    pub skipped: Vec<String>,
}

fn describe_skip(skipped: &SkippedCode) -> String {
    let reason = match &skipped.reason {
        SkipReason::NoData => "no data".to_string(),
        SkipReason::InsufficientHistory { bars } => format!("only {} bars", bars),
        SkipReason::Malformed { reason } | SkipReason::Failed { reason } => reason.clone(),
    };
    format!("{} ({})", skipped.code, reason)
}

/// Parses the strategy, analyses `codes` and ranks the matches.
pub fn build_screen_report<P>(
    data: &P,
    codes: &[String],
    strategy_name: &str,
    params: &ScreenParams,
) -> Result<ScreenReport, MarketLensError>
where
    P: DataPort + Sync + ?Sized,
{
    let strategy: ScreenStrategy = strategy_name.parse()?;
    let analysis = analyze_universe(data, codes);
    let matches = screen(&analysis.rows(), strategy, params);
    Ok(ScreenReport {
        strategy,
        matches,
        skipped: analysis.skipped.iter().map(describe_skip).collect(),
    })
}

fn run_screen(
    config_path: &Path,
    strategy: &str,
    codes: Option<&str>,
    threshold: Option<f64>,
    limit: Option<usize>,
    json: bool,
) -> Result<(), MarketLensError> {
    // Unknown names fail before any data is read.
    strategy.parse::<ScreenStrategy>()?;

    let config = load_config(config_path)?;
    let params = resolve_screen_params(&config, threshold, limit)?;
    let data = open_data(&config)?;
    let codes = match codes {
        Some(list) => parse_codes(list).map_err(|e| MarketLensError::ConfigInvalid {
            section: "cli".into(),
            key: "codes".into(),
            reason: e.to_string(),
        })?,
        None => data.list_symbols()?,
    };
    tracing::info!(strategy, codes = codes.len(), "screening");

    let report = build_screen_report(&data, &codes, strategy, &params)?;
    if json {
        println!("{}", to_json(&report)?);
        return Ok(());
    }

    for (rank, m) in report.matches.iter().enumerate() {
        let fields: Vec<String> = m
            .fields
            .iter()
            .map(|(k, v)| format!("{}={:.4}", k, v))
            .collect();
        println!(
            "{:>3}. {:<10} {} close {:.2} volume {}  {}",
            rank + 1,
            m.code,
            m.date,
            m.close,
            m.volume,
            fields.join(" ")
        );
    }
    eprintln!(
        "{} matches for {} ({} skipped)",
        report.matches.len(),
        report.strategy,
        report.skipped.len()
    );
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), MarketLensError> {
    let config = load_config(config_path)?;
    let symbols = open_data(&config)?.list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found");
    }
    for symbol in &symbols {
        println!("{}", symbol);
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), MarketLensError> {
    let config = load_config(config_path)?;
    let weights = load_scoring_weights(&config)?;
    let params = load_screen_params(&config)?;
    let path = data_path(&config)?;

    println!("data path:  {}", path.display());
    println!(
        "weights:    rsi {} ma {} macd {} kd {} volume {} adx {} bollinger {}",
        weights.rsi,
        weights.ma,
        weights.macd,
        weights.kd,
        weights.volume,
        weights.adx,
        weights.bollinger
    );
    println!(
        "screener:   rsi_threshold {} volume_multiple {} limit {}",
        params.rsi_threshold, params.volume_multiple, params.limit
    );
    eprintln!("Configuration is valid");
    Ok(())
}
