use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use tdseq_core::{
    Analyzer, Bar, DataField, Date, ErrCode, MaAboveRow, MaCross, MacdCross, Period,
    PriceHistory, SeqConfig, SeqError, Signal,
};

/// Report written next to the indicator CSV, one per input file.
#[derive(Serialize)]
struct FileReport<'a> {
    file: &'a str,
    period: Period,
    bars: usize,
    start_date: Date,
    end_date: Date,
    macd_crossovers: Vec<MacdCross>,
    ma_crossovers: Vec<MaCross>,
    ma_above_base: Vec<MaAboveRow>,
    signals: Vec<Signal>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let data_dir = args.get(1).map(String::as_str).unwrap_or("data");
    let out_dir = args.get(2).map(String::as_str).unwrap_or("output");
    fs::create_dir_all(out_dir)?;

    let mut paths: Vec<PathBuf> = fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        println!("No csv files under {}", data_dir);
        return Ok(());
    }

    let mut failed = 0usize;
    for path in &paths {
        if let Err(e) = process_file(path, Path::new(out_dir)) {
            eprintln!("Failed to process {}: {}", path.display(), e);
            failed += 1;
        }
    }
    println!("Processed {} file(s), {} failed", paths.len() - failed, failed);
    Ok(())
}

fn process_file(path: &Path, out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SeqError::new("file has no usable name", ErrCode::ParaError))?;
    let period = infer_period(stem);
    let config = SeqConfig::for_period(period);

    let bars = read_bars(path)?;
    let history = PriceHistory::new(bars, period, config.autofix)?;
    let analyzer = Analyzer::new(history, config)?;

    print_summary(stem, &analyzer);
    write_indicator_csv(&out_dir.join(format!("{}_indicators.csv", stem)), &analyzer)?;
    write_report(&out_dir.join(format!("{}_signals.json", stem)), stem, &analyzer)?;
    Ok(())
}

/// File naming picks the bar period: anything with "week" in the stem is
/// weekly, "month" monthly, everything else daily.
fn infer_period(stem: &str) -> Period {
    let lower = stem.to_lowercase();
    if lower.contains("week") {
        Period::Weekly
    } else if lower.contains("month") {
        Period::Monthly
    } else {
        Period::Daily
    }
}

fn read_bars(path: &Path) -> Result<Vec<Bar>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut date_col: Option<usize> = None;
    let mut columns: Vec<(usize, DataField)> = Vec::new();
    for (idx, name) in reader.headers()?.iter().enumerate() {
        let name = name.trim().to_lowercase();
        if name == "date" || name == "timestamp" {
            date_col = Some(idx);
        } else if let Ok(field) = DataField::from_str(&name) {
            columns.push((idx, field));
        }
    }
    let date_col = date_col
        .ok_or_else(|| SeqError::new("date column not found", ErrCode::MissingField))?;

    let mut bars = Vec::new();
    for record in reader.records() {
        let record = record?;
        let date_cell = record.get(date_col).unwrap_or("");
        let date: Date = date_cell.parse()?;
        let mut fields: HashMap<DataField, f64> = HashMap::new();
        for &(idx, field) in &columns {
            let cell = record.get(idx).unwrap_or("").trim();
            if cell.is_empty() {
                continue;
            }
            let value: f64 = cell.parse().map_err(|_| {
                SeqError::new(
                    format!("bad {} value '{}' on {}", field, cell, date),
                    ErrCode::BarDataInvalid,
                )
            })?;
            fields.insert(field, value);
        }
        bars.push(Bar::from_fields(date, &fields)?);
    }
    Ok(bars)
}

fn print_summary(name: &str, analyzer: &Analyzer) {
    let history = analyzer.history();
    println!(
        "=== {} ({} bars, {}, {} .. {}) ===",
        name,
        history.len(),
        history.period(),
        history.start_date(),
        history.end_date()
    );
    println!("  last close: {}", history.current().close);
    if let Some(mark) = analyzer.demark_marks().last() {
        println!(
            "  td phase: {} (setup {}, countdown {})",
            mark.phase, mark.setup_count, mark.countdown_count
        );
        if let Some(level) = mark.support {
            println!("  support: {}", level);
        }
        if let Some(level) = mark.resistance {
            println!("  resistance: {}", level);
        }
    }
    for signal in analyzer.signals() {
        println!("  [{}] {}", signal.severity, signal.message);
    }
}

fn write_indicator_csv(path: &Path, analyzer: &Analyzer) -> Result<(), Box<dyn Error>> {
    let history = analyzer.history();
    let ma_periods: Vec<usize> = analyzer.ma().keys().copied().collect();
    let ema_periods: Vec<usize> = analyzer.ema().keys().copied().collect();
    let with_macd = !analyzer.macd_rows().is_empty();
    let with_demark = !analyzer.demark_marks().is_empty();

    let mut writer = csv::Writer::from_path(path)?;
    let mut header: Vec<String> =
        ["date", "open", "high", "low", "close", "volume"].map(String::from).to_vec();
    header.extend(ma_periods.iter().map(|p| format!("MA{}", p)));
    header.extend(ema_periods.iter().map(|p| format!("EMA{}", p)));
    if with_macd {
        header.extend(["DIF", "DEA", "MACD"].map(String::from));
    }
    if with_demark {
        header.extend(
            [
                "TD_Phase",
                "TD_Setup_Count",
                "TD_Countdown_Count",
                "TD_Support_Price",
                "TD_Resistance_Price",
                "TD_Phase_Name",
            ]
            .map(String::from),
        );
    }
    writer.write_record(&header)?;

    for (i, bar) in history.iter().enumerate() {
        let mut row: Vec<String> = vec![
            bar.date.to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ];
        for period in &ma_periods {
            row.push(analyzer.ma()[period][i].to_string());
        }
        for period in &ema_periods {
            row.push(analyzer.ema()[period][i].to_string());
        }
        if with_macd {
            let item = analyzer.macd_rows()[i];
            row.push(item.dif.to_string());
            row.push(item.dea.to_string());
            row.push(item.macd.to_string());
        }
        if with_demark {
            let mark = analyzer.demark_marks()[i];
            row.push(mark.phase.code().to_string());
            row.push(mark.setup_count.to_string());
            row.push(mark.countdown_count.to_string());
            row.push(mark.support.map(|v| v.to_string()).unwrap_or_default());
            row.push(mark.resistance.map(|v| v.to_string()).unwrap_or_default());
            row.push(mark.phase.to_string());
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_report(path: &Path, name: &str, analyzer: &Analyzer) -> Result<(), Box<dyn Error>> {
    let history = analyzer.history();
    let macd_crossovers = if analyzer.macd_rows().is_empty() {
        Vec::new()
    } else {
        analyzer.find_macd_crossovers()?
    };

    let have_base = analyzer.ma_series(60).is_some();
    let mut ma_crossovers = Vec::new();
    let mut ma_above_base = Vec::new();
    if have_base {
        for fast in [20, 30] {
            if analyzer.ma_series(fast).is_some() {
                ma_crossovers.extend(analyzer.find_ma_crossovers(fast, 60)?);
            }
        }
        let fast_periods: Vec<usize> =
            [20, 30].into_iter().filter(|p| analyzer.ma_series(*p).is_some()).collect();
        if !fast_periods.is_empty() {
            ma_above_base = analyzer.find_ma_above(&fast_periods, 60)?;
        }
    }

    let report = FileReport {
        file: name,
        period: history.period(),
        bars: history.len(),
        start_date: history.start_date(),
        end_date: history.end_date(),
        macd_crossovers,
        ma_crossovers,
        ma_above_base,
        signals: analyzer.signals(),
    };
    fs::write(path, serde_json::to_string_pretty(&report)?)?;
    Ok(())
}
