//! CLI definition, settings and the download / evaluate pipelines.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{LevelFilter, info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart_adapter::{self, SvgChartAdapter};
use crate::adapters::yahoo_adapter::{self, YahooAdapter};
use crate::domain::backtest::{BacktestConfig, BacktestResult, run_backtest};
use crate::domain::config_validation::{unknown_keys, validate_config};
use crate::domain::error::ScanEqError;
use crate::domain::input::{DateRange, Ticker, parse_date};
use crate::domain::metrics::Metrics;
use crate::domain::strategy::StrategyKind;
use crate::logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_port::QuotePort;
use crate::ports::report_port::{ReportContext, ReportPort};
use crate::ports::store_port::StorePort;
use crate::shell::{self, Shell};

#[derive(Parser, Debug)]
#[command(
    name = "scaneq",
    about = "Download daily prices and backtest canned trading strategies"
)]
pub struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download daily OHLCV data to <TICKER>_data.csv
    Download {
        #[arg(short, long)]
        ticker: String,
        /// First date to fetch (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Day after the last date to fetch (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Backtest a strategy against downloaded data and write its chart
    Backtest {
        #[arg(short, long)]
        ticker: String,
        /// macs or bollinger
        #[arg(short, long, default_value = "macs")]
        strategy: StrategyKind,
        /// Chart file (defaults to <chart dir>/<TICKER>_<strategy>.svg)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Interactive form: ticker, dates, download and strategy actions
    Shell {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Resolved configuration with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub provider_url: String,
    pub timeout: Duration,
    pub backtest: BacktestConfig,
    pub chart_dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
    pub log_level: LevelFilter,
    /// Keys in the settings file that nothing reads.
    pub ignored_keys: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: PathBuf::from("."),
            provider_url: yahoo_adapter::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            backtest: BacktestConfig::default(),
            chart_dir: PathBuf::from("."),
            chart_width: svg_chart_adapter::DEFAULT_WIDTH,
            chart_height: svg_chart_adapter::DEFAULT_HEIGHT,
            log_level: LevelFilter::Warn,
            ignored_keys: Vec::new(),
        }
    }
}

pub fn build_settings(adapter: &dyn ConfigPort) -> Result<Settings, ScanEqError> {
    validate_config(adapter)?;
    let defaults = Settings::default();
    let bt = &defaults.backtest;

    let log_level = adapter
        .get_string("log", "level")
        .and_then(|l| logging::parse_level(&l))
        .unwrap_or(defaults.log_level);

    Ok(Settings {
        data_dir: adapter
            .get_string("data", "dir")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir),
        provider_url: adapter
            .get_string("data", "provider_url")
            .unwrap_or(defaults.provider_url),
        timeout: Duration::from_secs(
            adapter.get_int("data", "timeout_secs", defaults.timeout.as_secs() as i64) as u64,
        ),
        backtest: BacktestConfig {
            initial_cash: adapter.get_double("backtest", "cash", bt.initial_cash),
            commission: adapter.get_double("backtest", "commission", bt.commission),
            trade_on_close: adapter.get_bool("backtest", "trade_on_close", bt.trade_on_close),
            risk_free_rate: adapter.get_double("backtest", "risk_free_rate", bt.risk_free_rate),
        },
        chart_dir: adapter
            .get_string("chart", "dir")
            .map(PathBuf::from)
            .unwrap_or(defaults.chart_dir),
        chart_width: adapter.get_int("chart", "width", defaults.chart_width as i64) as u32,
        chart_height: adapter.get_int("chart", "height", defaults.chart_height as i64) as u32,
        log_level,
        ignored_keys: Vec::new(),
    })
}

pub fn load_settings(path: Option<&Path>) -> Result<Settings, ScanEqError> {
    match path {
        Some(path) => {
            let adapter = FileConfigAdapter::from_file(path)?;
            let mut settings = build_settings(&adapter)?;
            settings.ignored_keys = unknown_keys(&adapter.keys());
            Ok(settings)
        }
        None => build_settings(&FileConfigAdapter::default()),
    }
}

#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub ticker: Ticker,
    pub rows: usize,
    pub first: NaiveDate,
    pub last: NaiveDate,
    pub path: PathBuf,
}

/// Validate the form inputs, fetch the series and store it.
///
/// Inputs are checked in order (ticker, start, end, range) before any I/O.
pub fn download(
    quotes: &dyn QuotePort,
    store: &dyn StorePort,
    ticker: &str,
    start: &str,
    end: &str,
) -> Result<DownloadReport, ScanEqError> {
    let ticker = Ticker::parse(ticker)?;
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    let range = DateRange::new(start, end)?;

    let bars = quotes.fetch_daily(&ticker, &range)?;
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return Err(ScanEqError::EmptyDownload {
            ticker: ticker.to_string(),
        });
    };
    let (first, last) = (first.date, last.date);

    let path = store.save(&ticker, &bars)?;
    info!("saved {} rows for {} to {}", bars.len(), ticker, path.display());

    Ok(DownloadReport {
        ticker,
        rows: bars.len(),
        first,
        last,
        path,
    })
}

#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub ticker: Ticker,
    pub strategy: StrategyKind,
    pub bars: usize,
    pub result: BacktestResult,
    pub metrics: Metrics,
    pub chart_path: PathBuf,
}

pub fn default_chart_path(chart_dir: &Path, ticker: &Ticker, kind: StrategyKind) -> PathBuf {
    chart_dir.join(format!("{}_{}.svg", ticker, kind.slug()))
}

/// Load the stored series, run `kind` over it and write the chart.
pub fn evaluate(
    store: &dyn StorePort,
    report: &dyn ReportPort,
    ticker: &str,
    kind: StrategyKind,
    config: &BacktestConfig,
    chart_dir: &Path,
    output: Option<&Path>,
) -> Result<EvaluationReport, ScanEqError> {
    let ticker = Ticker::parse(ticker)?;
    let bars = store.load(&ticker)?;

    let mut rule = kind.build();
    if bars.len() < rule.min_bars() {
        return Err(ScanEqError::InsufficientData {
            strategy: kind.to_string(),
            bars: bars.len(),
            minimum: rule.min_bars(),
        });
    }

    info!("running {} over {} bars of {}", kind, bars.len(), ticker);
    let result = run_backtest(&bars, rule.as_mut(), config);
    let metrics = Metrics::compute(&result, &bars, config.risk_free_rate);

    let chart_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_chart_path(chart_dir, &ticker, kind));
    let ctx = ReportContext {
        ticker: &ticker,
        strategy: &result.strategy,
        bars: &bars,
        result: &result,
        indicators: rule.indicators(),
    };
    report.write(&ctx, &chart_path)?;

    Ok(EvaluationReport {
        ticker,
        strategy: kind,
        bars: bars.len(),
        result,
        metrics,
        chart_path,
    })
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
}

/// Stats table printed after a backtest.
pub fn summary_lines(report: &EvaluationReport) -> Vec<String> {
    let m = &report.metrics;
    let profit_factor = if m.profit_factor.is_infinite() {
        "inf".to_string()
    } else {
        format!("{:.2}", m.profit_factor)
    };
    vec![
        format!("Strategy:              {}", report.strategy),
        format!("Start:                 {}", fmt_date(m.start)),
        format!("End:                   {}", fmt_date(m.end)),
        format!("Duration:              {} days", m.duration_days),
        format!("Exposure Time:         {:.2}%", m.exposure * 100.0),
        format!("Equity Final:          ${:.2}", m.final_equity),
        format!("Equity Peak:           ${:.2}", m.peak_equity),
        format!("Return:                {:.2}%", m.total_return * 100.0),
        format!("Buy & Hold Return:     {:.2}%", m.buy_and_hold_return * 100.0),
        format!("Return (Ann.):         {:.2}%", m.annualized_return * 100.0),
        format!("Sharpe Ratio:          {:.2}", m.sharpe_ratio),
        format!("Sortino Ratio:         {:.2}", m.sortino_ratio),
        format!("Max. Drawdown:         -{:.2}%", m.max_drawdown * 100.0),
        format!("Max. Drawdown Length:  {} bars", m.max_drawdown_duration),
        format!("# Trades:              {}", m.total_trades),
        format!("Win Rate:              {:.1}%", m.win_rate * 100.0),
        format!("Profit Factor:         {}", profit_factor),
        format!("Avg. Win / Loss:       ${:.2} / ${:.2}", m.avg_win, m.avg_loss),
        format!("Best / Worst Trade:    ${:.2} / -${:.2}", m.largest_win, m.largest_loss),
        format!("Best Trade [%]:        {:.2}%", m.best_trade_return * 100.0),
        format!("Worst Trade [%]:       {:.2}%", m.worst_trade_return * 100.0),
        format!("Avg. Trade [%]:        {:.2}%", m.avg_trade_return * 100.0),
        format!("Avg. Trade Duration:   {:.1} days", m.avg_trade_duration),
        format!("Commissions:           ${:.2}", m.commissions),
    ]
}

pub fn run(cli: Cli) -> ExitCode {
    let config_path = match &cli.command {
        Command::Download { config, .. }
        | Command::Backtest { config, .. }
        | Command::Shell { config } => config.clone(),
    };

    let settings = match load_settings(config_path.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        settings.log_level
    };
    logging::init_logger(level);
    for key in &settings.ignored_keys {
        warn!("ignoring unknown setting {key}");
    }

    let store = CsvAdapter::new(settings.data_dir.clone());
    let chart = SvgChartAdapter::new(settings.chart_width, settings.chart_height);

    match cli.command {
        Command::Download {
            ticker, start, end, ..
        } => {
            let quotes = match YahooAdapter::new(&settings.provider_url, settings.timeout) {
                Ok(q) => q,
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            };
            run_download(&quotes, &store, &ticker, &start, &end)
        }
        Command::Backtest {
            ticker,
            strategy,
            output,
            ..
        } => run_evaluate(&store, &chart, &settings, &ticker, strategy, output.as_deref()),
        Command::Shell { .. } => {
            let quotes = match YahooAdapter::new(&settings.provider_url, settings.timeout) {
                Ok(q) => q,
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            };
            let mut shell = Shell::new(&quotes, &store, &chart, &settings);
            match shell::run_interactive(&mut shell) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    let err = ScanEqError::from(e);
                    eprintln!("error: {err}");
                    (&err).into()
                }
            }
        }
    }
}

pub fn run_download(
    quotes: &dyn QuotePort,
    store: &dyn StorePort,
    ticker: &str,
    start: &str,
    end: &str,
) -> ExitCode {
    eprintln!("Downloading {} from {} to {}", ticker, start, end);
    match download(quotes, store, ticker, start, end) {
        Ok(report) => {
            eprintln!(
                "Data for {} downloaded successfully: {} rows, {} to {}",
                report.ticker, report.rows, report.first, report.last
            );
            eprintln!("Written to: {}", report.path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn run_evaluate(
    store: &dyn StorePort,
    report_port: &dyn ReportPort,
    settings: &Settings,
    ticker: &str,
    kind: StrategyKind,
    output: Option<&Path>,
) -> ExitCode {
    eprintln!("Running {} strategy for {}", kind, ticker);
    match evaluate(
        store,
        report_port,
        ticker,
        kind,
        &settings.backtest,
        &settings.chart_dir,
        output,
    ) {
        Ok(report) => {
            eprintln!("\n=== Results: {} ({} bars) ===", report.ticker, report.bars);
            for line in summary_lines(&report) {
                eprintln!("{line}");
            }
            eprintln!("\nChart written to: {}", report.chart_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
