use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use compmap::api::GeocodeClient;
use compmap::config::FileConfig;
use compmap::enrich::enrich_table;
use compmap::filter::filter_competitions;
use compmap::table::{Table, read_csv};

/// Prepare competition datasets for European map rendering
///
/// Examples:
///   # Keep only European competitions
///   compmap filter -i all_comp.csv -o filtered_competitions.csv
///
///   # Report the match count without writing anything
///   compmap filter -i all_comp.csv
///
///   # Resolve venue coordinates (key from flag, GEOCODE_API_KEY, or config)
///   compmap geocode --api-key "$KEY"
///
///   # Both stages in one go
///   compmap run -i all_comp.csv -o updated_data1.csv
#[derive(Parser, Debug)]
#[command(name = "compmap")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches compmap.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Keep only rows whose country is on the European allowlist
    Filter {
        /// Input CSV path
        #[arg(short = 'i', long, default_value = "all_comp.csv")]
        input: PathBuf,

        /// Output CSV path (omit to report the match count without writing)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Name of the country column (overrides config)
        #[arg(long)]
        column: Option<String>,
    },
    /// Append latitude/longitude columns resolved from the venue column
    Geocode {
        /// Input CSV path
        #[arg(short = 'i', long, default_value = "filtered_competitions.csv")]
        input: PathBuf,

        /// Output CSV path
        #[arg(short = 'o', long, default_value = "updated_data1.csv")]
        output: PathBuf,

        /// Name of the venue column (overrides config)
        #[arg(long)]
        column: Option<String>,

        /// Geocoding API key (falls back to GEOCODE_API_KEY, then the config file)
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Run filter then geocode, handing the filtered file to the geocoder
    Run {
        /// Input CSV path
        #[arg(short = 'i', long, default_value = "all_comp.csv")]
        input: PathBuf,

        /// Intermediate filtered CSV path
        #[arg(long, default_value = "filtered_competitions.csv")]
        filtered: PathBuf,

        /// Output CSV path
        #[arg(short = 'o', long, default_value = "updated_data1.csv")]
        output: PathBuf,

        /// Geocoding API key (falls back to GEOCODE_API_KEY, then the config file)
        #[arg(long)]
        api_key: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            Some(toml::from_str(&contents).context("Failed to parse config file")?)
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };
    let config = file_config.unwrap_or_default();

    println!("compmap - Competition Map Data Prep");
    println!("===================================");
    println!();

    if args.verbose {
        println!("Configuration:");
        println!("  Geocoding endpoint: {}", config.endpoint);
        println!("  Request timeout: {}s", config.timeout_secs);
        println!("  Country column: {}", config.country_column);
        println!("  Venue column: {}", config.venue_column);
        println!();
    }

    match args.command {
        Command::Filter {
            input,
            output,
            column,
        } => {
            let column = column.unwrap_or_else(|| config.country_column.clone());
            run_filter(&input, output.as_deref(), &column)?;
        }
        Command::Geocode {
            input,
            output,
            column,
            api_key,
        } => {
            let column = column.unwrap_or_else(|| config.venue_column.clone());
            let client = build_client(api_key, &config)?;
            run_geocode(&input, &output, &column, &client)?;
        }
        Command::Run {
            input,
            filtered,
            output,
            api_key,
        } => {
            // Build the client first so a missing key fails before any work
            let client = build_client(api_key, &config)?;
            run_filter(&input, Some(filtered.as_path()), &config.country_column)?;
            run_geocode(&filtered, &output, &config.venue_column, &client)?;
        }
    }

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

/// Resolve the credential: CLI flag, then environment, then config file
fn build_client(cli_key: Option<String>, config: &FileConfig) -> Result<GeocodeClient> {
    let api_key = cli_key
        .or_else(|| std::env::var("GEOCODE_API_KEY").ok())
        .or_else(|| config.api_key.clone())
        .unwrap_or_default();

    GeocodeClient::new(
        config.endpoint.clone(),
        api_key,
        Duration::from_secs(config.timeout_secs),
    )
}

fn run_filter(input: &Path, output: Option<&Path>, column: &str) -> Result<Table> {
    let spinner = create_spinner("Reading competition data...");
    let start = Instant::now();
    let table = read_csv(input)?;
    spinner.finish_with_message(format!(
        "Read {} rows from {} [{:.1}s]",
        table.rows.len(),
        input.display(),
        start.elapsed().as_secs_f32()
    ));

    let filtered = filter_competitions(&table, column)?;
    println!(
        "Kept {} of {} rows ({} outside Europe)",
        filtered.rows.len(),
        table.rows.len(),
        table.rows.len() - filtered.rows.len()
    );

    if let Some(path) = output {
        filtered.write_csv(path)?;
        println!("Wrote {}", path.display());
    }

    Ok(filtered)
}

fn run_geocode(input: &Path, output: &Path, column: &str, client: &GeocodeClient) -> Result<()> {
    let spinner = create_spinner("Reading competition data...");
    let start = Instant::now();
    let mut table = read_csv(input)?;
    spinner.finish_with_message(format!(
        "Read {} rows from {} [{:.1}s]",
        table.rows.len(),
        input.display(),
        start.elapsed().as_secs_f32()
    ));

    let pb = ProgressBar::new(table.rows.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let stats = enrich_table(&mut table, column, |venue| {
        pb.set_message(venue.to_string());
        let result = client.lookup(venue);
        pb.inc(1);
        result
    })?;
    pb.finish_and_clear();

    println!(
        "Resolved {} venues, {} without a match [{:.1}s]",
        stats.resolved,
        stats.unresolved,
        start.elapsed().as_secs_f32()
    );

    table.write_csv(output)?;
    println!("Wrote {}", output.display());

    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
