//! Prompt-driven heatmap export.
//!
//! Usage: heatmap_cli [--config <preset.json>]
//!
//! Asks for a CSV path, the column roles and a lap, then writes the
//! heatmap figure to a PNG file.

use anyhow::{bail, Context, Result};
use pressure_heatmap::charts::{HeatmapPanel, StaticChartRenderer};
use pressure_heatmap::config::HeatmapConfig;
use pressure_heatmap::data::{ColumnRoles, DataLoader, DataPreparer, LapSelector};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = match parse_config_arg(&args)? {
        Some(path) => HeatmapConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load preset {}", path.display()))?,
        None => HeatmapConfig::default(),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();

    // --- CSV ---
    let csv_answer = prompt(&mut input, "Enter the path to your CSV file: ")?;
    let csv_path = PathBuf::from(csv_answer.trim());
    let dataset = DataLoader::read_csv(&csv_path)
        .with_context(|| format!("Failed to read {}", csv_path.display()))?;
    let columns = dataset.columns();

    println!("\nAvailable columns:");
    for (i, col) in columns.iter().enumerate() {
        println!("{}: {}", i, col);
    }

    // --- Column roles ---
    let lat = prompt_column(&mut input, "Latitude", &columns)?;
    let lon = prompt_column(&mut input, "Longitude", &columns)?;
    let port1 = prompt_column(&mut input, "Pressure Port 1", &columns)?;
    let port2 = prompt_optional_column(&mut input, "Pressure Port 2 (blank to skip)", &columns)?;
    let lap_col = prompt_column(&mut input, "Lap", &columns)?;

    let laps = dataset
        .lap_options(&lap_col)
        .with_context(|| format!("Failed to read lap values from '{}'", lap_col))?;
    let lap_list: Vec<String> = laps.iter().map(|l| l.to_string()).collect();
    println!("Laps found: {}", lap_list.join(", "));
    let selector = LapSelector::parse(&prompt(&mut input, "Enter the lap to plot (blank for all laps): ")?);

    let mut roles = ColumnRoles::new(&lat, &lon, &port1, &lap_col);
    if let Some(port2) = &port2 {
        roles = roles.with_second_port(port2);
    }

    // --- Pipeline ---
    let prepared = DataPreparer::prepare(&dataset, &roles, &selector)?;
    if prepared.is_empty() {
        println!("No rows left for {}; the figure will be empty.", selector.label());
    } else {
        println!("{} points for {}", prepared.len(), selector.label());
    }

    let panels = HeatmapPanel::from_prepared(&prepared);
    let ports: Vec<&str> = panels.iter().map(|p| p.port.as_str()).collect();
    let suptitle = config.figure_suptitle(csv_answer.trim(), &ports, &selector.label());

    // --- Output ---
    let default_output = default_output_path(&csv_path);
    let answer = prompt(
        &mut input,
        &format!("Output PNG [{}]: ", default_output.display()),
    )?;
    let output = if answer.trim().is_empty() {
        default_output
    } else {
        PathBuf::from(answer.trim())
    };

    StaticChartRenderer::save_png(&output, &panels, &config, &suptitle)
        .with_context(|| format!("Failed to render {}", output.display()))?;
    println!("Heatmap written to {}", output.display());
    Ok(())
}

/// Extract the `--config <path>` argument, if given.
fn parse_config_arg(args: &[String]) -> Result<Option<PathBuf>> {
    let program = args.first().map(String::as_str).unwrap_or("heatmap_cli");
    let mut config = None;
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--config" => match rest.next() {
                Some(path) => config = Some(PathBuf::from(path)),
                None => bail!("--config needs a file path"),
            },
            "-h" | "--help" => {
                println!("Usage: {} [--config <preset.json>]", program);
                std::process::exit(0);
            }
            other => bail!("Unknown argument '{}'. Usage: {} [--config <preset.json>]", other, program),
        }
    }
    Ok(config)
}

fn prompt(input: &mut impl BufRead, message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("Input closed before all answers were given");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_column(input: &mut impl BufRead, role: &str, columns: &[String]) -> Result<String> {
    loop {
        let answer = prompt(input, &format!("Enter the column for {}: ", role))?;
        match resolve_column(&answer, columns) {
            Some(col) => return Ok(col),
            None => println!("'{}' is not a column name or index, try again.", answer.trim()),
        }
    }
}

fn prompt_optional_column(
    input: &mut impl BufRead,
    role: &str,
    columns: &[String],
) -> Result<Option<String>> {
    loop {
        let answer = prompt(input, &format!("Enter the column for {}: ", role))?;
        if answer.trim().is_empty() {
            return Ok(None);
        }
        match resolve_column(&answer, columns) {
            Some(col) => return Ok(Some(col)),
            None => println!("'{}' is not a column name or index, try again.", answer.trim()),
        }
    }
}

/// Match an answer against the column list, by exact name first, then by index.
fn resolve_column(answer: &str, columns: &[String]) -> Option<String> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }
    if let Some(col) = columns.iter().find(|c| c.as_str() == answer) {
        return Some(col.clone());
    }
    answer
        .parse::<usize>()
        .ok()
        .and_then(|i| columns.get(i))
        .cloned()
}

fn default_output_path(csv: &Path) -> PathBuf {
    let stem = csv
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "telemetry".to_string());
    PathBuf::from(format!("{}_heatmap.png", stem))
}
