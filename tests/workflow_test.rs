//! End-to-end tests of the download and evaluate pipelines.
//!
//! A mock quote provider stands in for the network; the CSV store and SVG
//! chart adapters write to a temp directory.

mod common;

use common::*;
use scaneq::adapters::csv_adapter::CsvAdapter;
use scaneq::adapters::svg_chart_adapter::SvgChartAdapter;
use scaneq::cli::{download, evaluate};
use scaneq::domain::backtest::BacktestConfig;
use scaneq::domain::error::ScanEqError;
use scaneq::domain::input::Ticker;
use scaneq::domain::strategy::StrategyKind;
use scaneq::ports::store_port::StorePort;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    store: CsvAdapter,
    chart: SvgChartAdapter,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = CsvAdapter::new(dir.path().join("data"));
        Self {
            dir,
            store,
            chart: SvgChartAdapter::new(640, 480),
        }
    }

    fn evaluate(
        &self,
        ticker: &str,
        kind: StrategyKind,
        config: &BacktestConfig,
    ) -> Result<scaneq::cli::EvaluationReport, ScanEqError> {
        evaluate(
            &self.store,
            &self.chart,
            ticker,
            kind,
            config,
            &self.dir.path().join("charts"),
            None,
        )
    }
}

/// 20 flat bars, a dip, a jump and a collapse: SMA(10) crosses SMA(20) upward
/// on bar 21 and downward on bar 23.
fn crossing_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 20];
    closes.extend([90.0, 120.0, 120.0, 60.0]);
    closes
}

mod download_stage {
    use super::*;

    #[test]
    fn writes_csv_named_after_ticker() {
        let fx = Fixture::new();
        let quotes = MockQuotePort::new().with_bars("AAPL", wave_bars("2024-01-01", 40));

        let report = download(&quotes, &fx.store, "AAPL", "2024-01-01", "2024-02-01").unwrap();

        assert_eq!(report.rows, 31);
        assert_eq!(report.first, date(2024, 1, 1));
        assert_eq!(report.last, date(2024, 1, 31));
        assert_eq!(report.path, fx.dir.path().join("data").join("AAPL_data.csv"));
        assert!(report.path.exists());

        let (ticker, range) = quotes.requests.borrow()[0].clone();
        assert_eq!(ticker, "AAPL");
        assert_eq!(range.start, date(2024, 1, 1));
        assert_eq!(range.end, date(2024, 2, 1));
    }

    #[test]
    fn stored_rows_match_provider_rows() {
        let fx = Fixture::new();
        let bars = wave_bars("2024-01-01", 30);
        let quotes = MockQuotePort::new().with_bars("MSFT", bars.clone());

        download(&quotes, &fx.store, "MSFT", "2023-12-01", "2024-03-01").unwrap();
        let stored = fx.store.load(&Ticker::parse("MSFT").unwrap()).unwrap();
        assert_eq!(stored, bars);
    }

    #[test]
    fn redownload_replaces_file() {
        let fx = Fixture::new();
        let quotes = MockQuotePort::new().with_bars("IBM", wave_bars("2024-01-01", 60));

        download(&quotes, &fx.store, "IBM", "2024-01-01", "2024-03-01").unwrap();
        let report = download(&quotes, &fx.store, "IBM", "2024-01-10", "2024-01-20").unwrap();

        assert_eq!(report.rows, 10);
        let stored = fx.store.load(&Ticker::parse("IBM").unwrap()).unwrap();
        assert_eq!(stored.len(), 10);
    }

    #[test]
    fn invalid_ticker_rejected_before_fetch() {
        let fx = Fixture::new();
        let quotes = MockQuotePort::new();

        for bad in ["", "AAPL!", "TOOLONGTICKER", "BRK B"] {
            let err = download(&quotes, &fx.store, bad, "2024-01-01", "2024-02-01").unwrap_err();
            assert!(matches!(err, ScanEqError::InvalidTicker { .. }), "{bad:?}");
        }
        assert_eq!(quotes.request_count(), 0);
    }

    #[test]
    fn invalid_dates_rejected_before_fetch() {
        let fx = Fixture::new();
        let quotes = MockQuotePort::new();

        let err = download(&quotes, &fx.store, "AAPL", "2024-02-30", "2024-03-01").unwrap_err();
        assert!(matches!(err, ScanEqError::InvalidDate { ref input } if input == "2024-02-30"));

        let err = download(&quotes, &fx.store, "AAPL", "2024-01-01", "01/02/2024").unwrap_err();
        assert!(matches!(err, ScanEqError::InvalidDate { ref input } if input == "01/02/2024"));

        let err = download(&quotes, &fx.store, "AAPL", "2024-02-01", "2024-01-01").unwrap_err();
        assert!(matches!(err, ScanEqError::InvalidDateRange { .. }));

        assert_eq!(quotes.request_count(), 0);
    }

    #[test]
    fn empty_download_writes_nothing() {
        let fx = Fixture::new();
        let quotes = MockQuotePort::new();

        let err = download(&quotes, &fx.store, "ZZZZ", "2024-01-01", "2024-02-01").unwrap_err();
        assert!(matches!(err, ScanEqError::EmptyDownload { ref ticker } if ticker == "ZZZZ"));
        assert!(!fx.store.path_for(&Ticker::parse("ZZZZ").unwrap()).exists());
    }

    #[test]
    fn provider_failure_is_reported() {
        let fx = Fixture::new();
        let quotes = MockQuotePort::new().with_error("AAPL", "connection reset");

        let err = download(&quotes, &fx.store, "AAPL", "2024-01-01", "2024-02-01").unwrap_err();
        match err {
            ScanEqError::Provider { reason } => assert_eq!(reason, "connection reset"),
            other => panic!("expected Provider, got {other:?}"),
        }
    }
}

mod evaluate_stage {
    use super::*;

    #[test]
    fn missing_file_names_the_expected_path() {
        let fx = Fixture::new();
        let err = fx
            .evaluate("AAPL", StrategyKind::Macs, &BacktestConfig::default())
            .unwrap_err();
        match err {
            ScanEqError::MissingData { ticker, path } => {
                assert_eq!(ticker, "AAPL");
                assert!(path.ends_with("AAPL_data.csv"));
            }
            other => panic!("expected MissingData, got {other:?}"),
        }
    }

    #[test]
    fn invalid_ticker_is_rejected() {
        let fx = Fixture::new();
        let err = fx
            .evaluate("../etc", StrategyKind::Macs, &BacktestConfig::default())
            .unwrap_err();
        assert!(matches!(err, ScanEqError::InvalidTicker { .. }));
    }

    #[test]
    fn too_few_bars_for_strategy() {
        let fx = Fixture::new();
        let ticker = Ticker::parse("NEW").unwrap();
        fx.store
            .save(&ticker, &wave_bars("2024-01-01", 20))
            .unwrap();

        match fx
            .evaluate("NEW", StrategyKind::Macs, &BacktestConfig::default())
            .unwrap_err()
        {
            ScanEqError::InsufficientData {
                strategy,
                bars,
                minimum,
            } => {
                assert_eq!(strategy, "MACS");
                assert_eq!(bars, 20);
                assert_eq!(minimum, 21);
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }

        // Bollinger only needs one full window.
        assert!(
            fx.evaluate("NEW", StrategyKind::BollingerBands, &BacktestConfig::default())
                .is_ok()
        );
    }

    #[test]
    fn macs_enters_at_open_after_crossing() {
        let fx = Fixture::new();
        let ticker = Ticker::parse("CROSS").unwrap();
        fx.store
            .save(&ticker, &bars_from_closes("2024-01-01", &crossing_closes()))
            .unwrap();

        let report = fx
            .evaluate("CROSS", StrategyKind::Macs, &BacktestConfig::default())
            .unwrap();
        let trades = &report.result.portfolio.closed_trades;

        // Buy signalled on bar 21 fills at bar 22's open; the sell on the last
        // bar has no next open, so the runner closes at the last close instead.
        assert_eq!(trades.len(), 1);
        assert!(trades[0].is_long());
        assert_eq!(trades[0].entry_bar, 22);
        assert_eq!(trades[0].entry_price, 120.0);
        assert_eq!(trades[0].exit_price, 60.0);
        assert!(trades[0].end_of_data);
        assert_eq!(trades[0].quantity, 83);
    }

    #[test]
    fn macs_trade_on_close_flips_at_crossing_bars() {
        let fx = Fixture::new();
        let ticker = Ticker::parse("CROSS").unwrap();
        fx.store
            .save(&ticker, &bars_from_closes("2024-01-01", &crossing_closes()))
            .unwrap();
        let config = BacktestConfig {
            trade_on_close: true,
            ..Default::default()
        };

        let report = fx.evaluate("CROSS", StrategyKind::Macs, &config).unwrap();
        let trades = &report.result.portfolio.closed_trades;

        assert_eq!(trades.len(), 2);
        assert!(trades[0].is_long());
        assert_eq!((trades[0].entry_bar, trades[0].exit_bar), (21, 23));
        assert!(!trades[0].end_of_data);
        assert!(!trades[1].is_long());
        assert_eq!(trades[1].entry_bar, 23);
        assert!(trades[1].end_of_data);
    }

    #[test]
    fn full_run_writes_chart_and_metrics() {
        let fx = Fixture::new();
        let ticker = Ticker::parse("WAVE").unwrap();
        let bars = wave_bars("2023-01-01", 250);
        fx.store.save(&ticker, &bars).unwrap();

        for kind in StrategyKind::ALL {
            let report = fx.evaluate("WAVE", kind, &BacktestConfig::default()).unwrap();

            assert_eq!(report.bars, 250);
            assert_eq!(report.result.portfolio.equity_curve.len(), 250);
            assert!(report.result.portfolio.position.is_none());
            assert!(report.metrics.total_trades > 0, "{kind} made no trades");
            assert_eq!(report.metrics.start, Some(date(2023, 1, 1)));
            assert_eq!(
                report.chart_path,
                fx.dir.path().join("charts").join(format!("WAVE_{}.svg", kind.slug()))
            );
            let svg = std::fs::read_to_string(&report.chart_path).unwrap();
            assert!(svg.contains("<svg"));
        }
    }

    #[test]
    fn explicit_output_path_is_used() {
        let fx = Fixture::new();
        let ticker = Ticker::parse("WAVE").unwrap();
        fx.store.save(&ticker, &wave_bars("2023-01-01", 60)).unwrap();
        let output = fx.dir.path().join("custom.svg");

        let report = evaluate(
            &fx.store,
            &fx.chart,
            "WAVE",
            StrategyKind::BollingerBands,
            &BacktestConfig::default(),
            fx.dir.path(),
            Some(&output),
        )
        .unwrap();
        assert_eq!(report.chart_path, output);
        assert!(output.exists());
    }

    #[test]
    fn download_then_evaluate() {
        let fx = Fixture::new();
        let quotes = MockQuotePort::new().with_bars("SPY", wave_bars("2023-01-01", 200));

        download(&quotes, &fx.store, "SPY", "2023-01-01", "2024-01-01").unwrap();
        let report = fx
            .evaluate("SPY", StrategyKind::Macs, &BacktestConfig::default())
            .unwrap();

        assert_eq!(report.bars, 200);
        assert!(report.chart_path.exists());
    }
}
