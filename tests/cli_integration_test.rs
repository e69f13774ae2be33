//! CLI and shell integration tests.
//!
//! Tests cover:
//! - Settings loaded from INI files on disk
//! - Exit codes of the download and backtest commands
//! - Shell form actions and their titled messages

mod common;

use common::*;
use scaneq::adapters::csv_adapter::CsvAdapter;
use scaneq::adapters::svg_chart_adapter::SvgChartAdapter;
use scaneq::cli::{self, Settings};
use scaneq::domain::error::ScanEqError;
use scaneq::domain::input::Ticker;
use scaneq::domain::strategy::StrategyKind;
use scaneq::ports::store_port::StorePort;
use scaneq::shell::{Action, Message, Shell};
use std::io::Write;
use std::process::ExitCode;
use tempfile::TempDir;

/// `ExitCode` has no portable equality, so compare the debug rendering.
fn same_exit(actual: ExitCode, expected: ExitCode) -> bool {
    format!("{actual:?}") == format!("{expected:?}")
}

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

mod settings {
    use super::*;

    #[test]
    fn loads_from_file() {
        let file = write_temp_ini(
            "[data]\ndir = /srv/prices\n\n[backtest]\ncash = 2500\n\n[log]\nlevel = debug\n",
        );
        let settings = cli::load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.data_dir, std::path::PathBuf::from("/srv/prices"));
        assert!((settings.backtest.initial_cash - 2500.0).abs() < f64::EPSILON);
        assert_eq!(settings.log_level, log::LevelFilter::Debug);
    }

    #[test]
    fn misspelled_keys_are_collected() {
        let file = write_temp_ini("[backtest]\ncash = 5000\ncomission = 0.01\n\n[plot]\nwidth = 900\n");
        let settings = cli::load_settings(Some(file.path())).unwrap();
        assert!((settings.backtest.initial_cash - 5000.0).abs() < f64::EPSILON);
        assert_eq!(
            settings.ignored_keys,
            vec!["[backtest] comission".to_string(), "[plot] width".to_string()]
        );
    }

    #[test]
    fn fractional_chart_size_is_rejected() {
        let file = write_temp_ini("[chart]\nwidth = 640.5\n");
        let err = cli::load_settings(Some(file.path())).unwrap_err();
        assert!(matches!(err, ScanEqError::ConfigInvalid { ref key, .. } if key == "width"));
    }

    #[test]
    fn no_file_means_defaults() {
        assert_eq!(cli::load_settings(None).unwrap(), Settings::default());
    }

    #[test]
    fn invalid_value_in_file_fails() {
        let file = write_temp_ini("[backtest]\ncommission = 2\n");
        let err = cli::load_settings(Some(file.path())).unwrap_err();
        assert!(matches!(err, ScanEqError::ConfigInvalid { ref key, .. } if key == "commission"));
        assert!(same_exit(ExitCode::from(&err), ExitCode::from(2)));
    }
}

mod exit_codes {
    use super::*;

    fn settings_in(dir: &TempDir) -> Settings {
        Settings {
            data_dir: dir.path().join("data"),
            chart_dir: dir.path().join("charts"),
            ..Settings::default()
        }
    }

    #[test]
    fn download_success_and_failures() {
        let dir = TempDir::new().unwrap();
        let store = CsvAdapter::new(dir.path().to_path_buf());
        let quotes = MockQuotePort::new()
            .with_bars("AAPL", wave_bars("2024-01-01", 30))
            .with_error("DOWN", "timed out");

        assert!(same_exit(
            cli::run_download(&quotes, &store, "AAPL", "2024-01-01", "2024-02-01"),
            ExitCode::SUCCESS
        ));
        assert!(same_exit(
            cli::run_download(&quotes, &store, "AAPL$", "2024-01-01", "2024-02-01"),
            ExitCode::from(2)
        ));
        assert!(same_exit(
            cli::run_download(&quotes, &store, "AAPL", "2024-13-01", "2024-02-01"),
            ExitCode::from(2)
        ));
        assert!(same_exit(
            cli::run_download(&quotes, &store, "NONE", "2024-01-01", "2024-02-01"),
            ExitCode::from(3)
        ));
        assert!(same_exit(
            cli::run_download(&quotes, &store, "DOWN", "2024-01-01", "2024-02-01"),
            ExitCode::from(3)
        ));
    }

    #[test]
    fn backtest_success_and_failures() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        let store = CsvAdapter::new(settings.data_dir.clone());
        let chart = SvgChartAdapter::new(640, 480);

        assert!(same_exit(
            cli::run_evaluate(&store, &chart, &settings, "AAPL", StrategyKind::Macs, None),
            ExitCode::from(4)
        ));

        let ticker = Ticker::parse("AAPL").unwrap();
        store.save(&ticker, &wave_bars("2024-01-01", 10)).unwrap();
        assert!(same_exit(
            cli::run_evaluate(&store, &chart, &settings, "AAPL", StrategyKind::Macs, None),
            ExitCode::from(5)
        ));

        store.save(&ticker, &wave_bars("2024-01-01", 120)).unwrap();
        assert!(same_exit(
            cli::run_evaluate(
                &store,
                &chart,
                &settings,
                "AAPL",
                StrategyKind::BollingerBands,
                None
            ),
            ExitCode::SUCCESS
        ));
        assert!(dir.path().join("charts").join("AAPL_bollinger.svg").exists());
    }

    #[test]
    fn malformed_csv_is_data_error() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        std::fs::create_dir_all(&settings.data_dir).unwrap();
        std::fs::write(
            settings.data_dir.join("BAD_data.csv"),
            "Date,Open,High,Low,Close,Volume\nyesterday,1,1,1,1,1\n",
        )
        .unwrap();
        let store = CsvAdapter::new(settings.data_dir.clone());
        let chart = SvgChartAdapter::default();

        assert!(same_exit(
            cli::run_evaluate(&store, &chart, &settings, "BAD", StrategyKind::Macs, None),
            ExitCode::from(4)
        ));

        std::fs::write(
            settings.data_dir.join("BIN_data.csv"),
            b"Date,Open,High,Low,Close,Volume\n2024-01-02,1,1,1,\xff,1\n",
        )
        .unwrap();
        assert!(same_exit(
            cli::run_evaluate(&store, &chart, &settings, "BIN", StrategyKind::Macs, None),
            ExitCode::from(4)
        ));
    }
}

mod shell_actions {
    use super::*;

    struct Env {
        dir: TempDir,
        settings: Settings,
        store: CsvAdapter,
        chart: SvgChartAdapter,
        quotes: MockQuotePort,
    }

    fn env() -> Env {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            data_dir: dir.path().to_path_buf(),
            chart_dir: dir.path().to_path_buf(),
            ..Settings::default()
        };
        let store = CsvAdapter::new(settings.data_dir.clone());
        Env {
            dir,
            settings,
            store,
            chart: SvgChartAdapter::new(640, 480),
            quotes: MockQuotePort::new().with_bars("TSLA", wave_bars("2023-01-01", 150)),
        }
    }

    fn fill(shell: &mut Shell<'_>, ticker: &str, start: &str, end: &str) {
        shell.form.ticker = ticker.into();
        shell.form.start = start.into();
        shell.form.end = end.into();
    }

    #[test]
    fn download_reports_success() {
        let e = env();
        let mut shell = Shell::new(&e.quotes, &e.store, &e.chart, &e.settings);
        fill(&mut shell, "TSLA", "2023-01-01", "2024-01-01");

        let msg = shell.handle(Action::Download);
        assert!(!msg.is_error(), "{msg:?}");
        assert_eq!(msg.title(), "Download");
        assert!(msg.body().contains("Data for TSLA downloaded successfully"));
        assert!(e.dir.path().join("TSLA_data.csv").exists());
    }

    #[test]
    fn invalid_inputs_show_titled_errors() {
        let e = env();
        let mut shell = Shell::new(&e.quotes, &e.store, &e.chart, &e.settings);

        fill(&mut shell, "TS LA", "2023-01-01", "2024-01-01");
        assert_eq!(shell.handle(Action::Download).title(), "Invalid Ticker");

        fill(&mut shell, "TSLA", "2023-1-1x", "2024-01-01");
        assert_eq!(shell.handle(Action::Download).title(), "Invalid Date");

        fill(&mut shell, "NOPE", "2023-01-01", "2024-01-01");
        let msg = shell.handle(Action::Download);
        assert!(msg.is_error());
        assert_eq!(msg.title(), "Download Failed");

        assert_eq!(
            shell
                .handle(Action::Evaluate(StrategyKind::Macs))
                .title(),
            "Data Error"
        );
    }

    #[test]
    fn evaluate_after_download_reports_stats_and_chart() {
        let e = env();
        let mut shell = Shell::new(&e.quotes, &e.store, &e.chart, &e.settings);
        fill(&mut shell, "TSLA", "2023-01-01", "2024-01-01");
        assert!(!shell.handle(Action::Download).is_error());

        // Dates are only needed for the download.
        shell.form.start.clear();
        shell.form.end.clear();

        for kind in StrategyKind::ALL {
            let msg = shell.handle(Action::Evaluate(kind));
            match &msg {
                Message::Info { title, body } => {
                    assert_eq!(title, &format!("TSLA {kind}"));
                    assert!(body.contains("Sharpe Ratio"));
                    assert!(body.contains("Avg. Trade [%]"));
                    assert!(body.contains(&format!("TSLA_{}.svg", kind.slug())));
                }
                Message::Error { .. } => panic!("unexpected error {msg:?}"),
            }
        }
    }
}
