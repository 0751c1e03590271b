//! TapeScan CLI: scan CSV candle files and print ranked signals.
//!
//! Commands:
//! - `scan`: load `<INSTRUMENT>_<timeframe>.csv` files, run one scan, print JSON or alerts
//! - `config`: print the default engine configuration as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tapescan_core::domain::{Candle, Timeframe};
use tapescan_core::{EngineConfig, MemoryCandleSource, SignalEngine, SignalReport};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tapescan", about = "TapeScan CLI: multi-timeframe signal scanner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scan over CSV candle files.
    Scan {
        /// Directory holding `<INSTRUMENT>_<timeframe>.csv` files.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Instruments to scan (e.g., BTC ETH SOL).
        #[arg(long, required = true, num_args = 1..)]
        universe: Vec<String>,

        /// Instrument whose tape gates the whole run.
        #[arg(long, default_value = "BTC")]
        anchor: String,

        /// Path to a TOML config file. Defaults to built-in parameters.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the default configuration as TOML.
    Config,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// One CSV row: `timestamp,open,high,low,close,volume`.
#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<CandleRow> for Candle {
    fn from(row: CandleRow) -> Self {
        Candle {
            timestamp: row.timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            data_dir,
            universe,
            anchor,
            config,
            format,
        } => run_scan(&data_dir, &universe, &anchor, config.as_deref(), format),
        Commands::Config => {
            print!("{}", EngineConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn run_scan(
    data_dir: &Path,
    universe: &[String],
    anchor: &str,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let config = match config_path {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let timeframes = [
        config.run.structure_timeframe,
        config.run.trigger_timeframe,
    ];

    let source = load_source(data_dir, universe, &timeframes)?;
    if source.is_empty() {
        bail!("no candle files found in {}", data_dir.display());
    }
    info!(
        data_dir = %data_dir.display(),
        series = source.len(),
        "candle files loaded"
    );

    let engine = SignalEngine::new(config)?;
    let report = engine
        .generate_signals(&source, universe, anchor)
        .with_context(|| format!("scan with anchor {anchor} failed"))?;

    println!("{}", render(&report, format)?);
    Ok(())
}

/// Load every `<INSTRUMENT>_<timeframe>.csv` that exists for the universe.
/// Missing files are skipped; the engine reports them as missing data.
fn load_source(
    data_dir: &Path,
    universe: &[String],
    timeframes: &[Timeframe],
) -> Result<MemoryCandleSource> {
    let mut source = MemoryCandleSource::new();
    for instrument in universe {
        for &timeframe in timeframes {
            let path = data_dir.join(csv_file_name(instrument, timeframe));
            if !path.exists() {
                debug!(path = %path.display(), "candle file missing");
                continue;
            }
            let candles = read_candles(&path)?;
            source.insert(instrument.as_str(), timeframe, candles);
        }
    }
    Ok(source)
}

fn csv_file_name(instrument: &str, timeframe: Timeframe) -> String {
    format!("{instrument}_{timeframe}.csv")
}

fn read_candles(path: &Path) -> Result<Vec<Candle>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut candles = Vec::new();
    for (i, row) in reader.deserialize::<CandleRow>().enumerate() {
        let row = row.with_context(|| format!("{}: bad row {}", path.display(), i + 1))?;
        candles.push(Candle::from(row));
    }
    Ok(candles)
}

fn render(report: &SignalReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => Ok(render_text(report)),
    }
}

fn render_text(report: &SignalReport) -> String {
    let ctx = &report.context;
    let mut out = format!(
        "=== Context: {} ===\nTrend:      {} (ADX {:.1})\nVolatility: {:?}\nSession:    {}\nTrading:    {}\n",
        ctx.anchor,
        ctx.trend,
        ctx.trend_strength,
        ctx.volatility,
        ctx.session_quality,
        if ctx.should_trade { "open" } else { "closed" },
    );
    out.push_str(&format!(
        "Candidates: {} | Run: {}\n",
        report.candidates.len(),
        report.run_id
    ));

    if report.signals.is_empty() {
        out.push_str("\nNo signals.");
        return out;
    }
    for (rank, signal) in report.signals.iter().enumerate() {
        out.push_str(&format!("\n#{} {}\n", rank + 1, signal));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tapescan_core::CandleSource;

    const HEADER: &str = "timestamp,open,high,low,close,volume\n";

    fn write_csv(dir: &Path, name: &str, rows: &[(i64, f64, f64, f64, f64, f64)]) {
        let mut body = HEADER.to_string();
        for (ts, o, h, l, c, v) in rows {
            body.push_str(&format!("{ts},{o},{h},{l},{c},{v}\n"));
        }
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn csv_file_names_use_timeframe_labels() {
        assert_eq!(csv_file_name("BTC", Timeframe::H4), "BTC_4h.csv");
        assert_eq!(csv_file_name("ETH", Timeframe::H1), "ETH_1h.csv");
    }

    #[test]
    fn reads_candles_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "BTC_1h.csv",
            &[
                (1_704_067_200, 100.0, 101.0, 99.0, 100.5, 10.0),
                (1_704_070_800, 100.5, 102.0, 100.0, 101.5, 12.5),
            ],
        );
        let candles = read_candles(&dir.path().join("BTC_1h.csv")).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].timestamp, 1_704_070_800);
        assert_eq!(candles[1].close, 101.5);
        assert_eq!(candles[1].volume, 12.5);
    }

    #[test]
    fn malformed_row_is_reported_with_its_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BTC_1h.csv");
        fs::write(&path, format!("{HEADER}1704067200,100,101,99,abc,10\n")).unwrap();
        let err = read_candles(&path).unwrap_err();
        assert!(format!("{err:#}").contains("bad row 1"), "{err:#}");
    }

    #[test]
    fn load_source_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "BTC_1h.csv",
            &[(1_704_067_200, 100.0, 101.0, 99.0, 100.5, 10.0)],
        );
        let universe = vec!["BTC".to_string(), "ETH".to_string()];
        let source =
            load_source(dir.path(), &universe, &[Timeframe::H4, Timeframe::H1]).unwrap();
        assert_eq!(source.len(), 1);
        assert_eq!(source.get_candles("BTC", Timeframe::H1, 10).unwrap().len(), 1);
        assert!(source.get_candles("ETH", Timeframe::H1, 10).is_err());
    }

    #[test]
    fn scan_without_files_fails() {
        let dir = tempfile::tempdir().unwrap();
        let universe = vec!["BTC".to_string()];
        let err = run_scan(dir.path(), &universe, "BTC", None, OutputFormat::Json).unwrap_err();
        assert!(err.to_string().contains("no candle files"));
    }

    #[test]
    fn text_report_without_signals_says_so() {
        let dir = tempfile::tempdir().unwrap();
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + [0.0, 0.6, 0.1, -0.5][i % 4]).collect();
        for (tf, step) in [("4h", 14_400_i64), ("1h", 3600)] {
            let rows: Vec<_> = closes
                .iter()
                .enumerate()
                .map(|(i, &c)| (1_704_067_200 + i as i64 * step, c, c + 1.0, c - 1.0, c, 1000.0))
                .collect();
            write_csv(dir.path(), &format!("BTC_{tf}.csv"), &rows);
        }
        let universe = vec!["BTC".to_string()];
        let source =
            load_source(dir.path(), &universe, &[Timeframe::H4, Timeframe::H1]).unwrap();
        let engine = SignalEngine::new(EngineConfig::default()).unwrap();
        let report = engine.generate_signals(&source, &universe, "BTC").unwrap();

        let text = render_text(&report);
        assert!(text.starts_with("=== Context: BTC ==="));
        assert!(text.ends_with("No signals."));

        let json = render(&report, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["context"]["anchor"], "BTC");
        assert!(parsed["signals"].as_array().unwrap().is_empty());
    }

    #[test]
    fn default_config_prints_as_loadable_toml() {
        let text = EngineConfig::default().to_toml().unwrap();
        let parsed = EngineConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.fingerprint(), EngineConfig::default().fingerprint());
    }
}
