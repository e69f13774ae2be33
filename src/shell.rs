//! Interactive terminal form.
//!
//! Three fields (ticker, start date, end date) and three actions: download the
//! data, run MACS, run Bollinger Bands. Every action ends in a titled message;
//! errors never leave the loop.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use log::debug;
use std::io;

use crate::cli::{Settings, download, evaluate, summary_lines};
use crate::domain::strategy::StrategyKind;
use crate::ports::quote_port::QuotePort;
use crate::ports::report_port::ReportPort;
use crate::ports::store_port::StorePort;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    pub ticker: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Download,
    Evaluate(StrategyKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Info { title: String, body: String },
    Error { title: String, body: String },
}

impl Message {
    pub fn title(&self) -> &str {
        match self {
            Message::Info { title, .. } | Message::Error { title, .. } => title,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Message::Info { body, .. } | Message::Error { body, .. } => body,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Message::Error { .. })
    }
}

pub struct Shell<'a> {
    quotes: &'a dyn QuotePort,
    store: &'a dyn StorePort,
    report: &'a dyn ReportPort,
    settings: &'a Settings,
    pub form: Form,
}

impl<'a> Shell<'a> {
    pub fn new(
        quotes: &'a dyn QuotePort,
        store: &'a dyn StorePort,
        report: &'a dyn ReportPort,
        settings: &'a Settings,
    ) -> Self {
        Self {
            quotes,
            store,
            report,
            settings,
            form: Form::default(),
        }
    }

    pub fn handle(&self, action: Action) -> Message {
        debug!("shell action {:?} with {:?}", action, self.form);
        match action {
            Action::Download => match download(
                self.quotes,
                self.store,
                &self.form.ticker,
                &self.form.start,
                &self.form.end,
            ) {
                Ok(report) => Message::Info {
                    title: "Download".into(),
                    body: format!(
                        "Data for {} downloaded successfully ({} rows, {} to {}).\nSaved to {}",
                        report.ticker,
                        report.rows,
                        report.first,
                        report.last,
                        report.path.display()
                    ),
                },
                Err(e) => Message::Error {
                    title: e.title().into(),
                    body: e.to_string(),
                },
            },
            Action::Evaluate(kind) => match evaluate(
                self.store,
                self.report,
                &self.form.ticker,
                kind,
                &self.settings.backtest,
                &self.settings.chart_dir,
                None,
            ) {
                Ok(report) => {
                    let mut lines = summary_lines(&report);
                    lines.push(format!("Chart: {}", report.chart_path.display()));
                    Message::Info {
                        title: format!("{} {}", report.ticker, kind),
                        body: lines.join("\n"),
                    }
                }
                Err(e) => Message::Error {
                    title: e.title().into(),
                    body: e.to_string(),
                },
            },
        }
    }
}

fn show(message: &Message) {
    let marker = if message.is_error() { "!!" } else { "--" };
    eprintln!("\n{marker} {} {marker}\n{}\n", message.title(), message.body());
}

fn edit(theme: &ColorfulTheme, prompt: &str, current: &str) -> io::Result<String> {
    Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
}

/// Drive the form until the user quits.
pub fn run_interactive(shell: &mut Shell<'_>) -> io::Result<()> {
    let theme = ColorfulTheme::default();
    loop {
        let items = [
            format!("Ticker: {}", shell.form.ticker),
            format!("Start Date (YYYY-MM-DD): {}", shell.form.start),
            format!("End Date (YYYY-MM-DD): {}", shell.form.end),
            "Download Data".to_string(),
            "MACS Strategy".to_string(),
            "Bollinger Bands Strategy".to_string(),
            "Quit".to_string(),
        ];
        let choice = Select::with_theme(&theme)
            .with_prompt("Backtesting Application")
            .items(&items)
            .default(0)
            .interact()?;

        match choice {
            0 => shell.form.ticker = edit(&theme, "Ticker", &shell.form.ticker)?,
            1 => shell.form.start = edit(&theme, "Start Date (YYYY-MM-DD)", &shell.form.start)?,
            2 => shell.form.end = edit(&theme, "End Date (YYYY-MM-DD)", &shell.form.end)?,
            3 => show(&shell.handle(Action::Download)),
            4 => show(&shell.handle(Action::Evaluate(StrategyKind::Macs))),
            5 => show(&shell.handle(Action::Evaluate(StrategyKind::BollingerBands))),
            _ => return Ok(()),
        }
    }
}
