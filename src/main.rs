use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use sales_analyzer::{
    analysis::{Forecast, GroupKey, MAX_HORIZON},
    export::{export_excel, export_pdf, EXCEL_REPORT, PDF_REPORT},
    io,
    visualization::{
        money, print_describe_table, print_forecast_table, print_group_bars, print_group_table,
        print_overview, print_preview, print_sales_summary, print_trend_table, render_all,
    },
    Analyzer, AnalyzerConfig, SalesError,
};

#[derive(Parser)]
#[command(
    name = "sales-analyzer",
    about = "Sales Data Analyzer - statistics, breakdowns, forecasts and reports",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze sales data and print the report
    Analyze {
        /// Path to input file (CSV, JSON, or Excel)
        #[arg(short, long)]
        input: PathBuf,

        /// Render chart images into the output directory
        #[arg(long)]
        visualize: bool,

        /// Export the multi-sheet Excel report
        #[arg(long)]
        excel: bool,

        /// Export the PDF report
        #[arg(long)]
        pdf: bool,

        /// Show the moving-average sales forecast
        #[arg(long)]
        forecast: bool,

        /// Enable charts, Excel, PDF and forecast
        #[arg(long)]
        all: bool,

        /// Directory for charts and reports
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Number of days to forecast
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_HORIZON)))]
        horizon: Option<u32>,

        /// Optional TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Convert sales data between formats
    Convert {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Display a quick summary of the sales data
    Summary {
        /// Path to input file
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Sections whose columns are missing are skipped with a notice.
fn notice(section: &str, err: &SalesError) {
    println!("\n{} {section} skipped: {err}", "Notice:".yellow().bold());
}

#[allow(clippy::too_many_arguments)]
fn analyze(
    input: &Path,
    visualize: bool,
    excel: bool,
    pdf: bool,
    forecast: bool,
    output_dir: Option<PathBuf>,
    horizon: Option<u32>,
    config: Option<PathBuf>,
) -> Result<()> {
    let mut cfg = AnalyzerConfig::load_or_default(config.as_deref())?;
    if let Some(dir) = output_dir {
        cfg.output.dir = dir;
    }
    if let Some(days) = horizon {
        cfg.forecast.horizon = days;
    }

    println!(
        "\n{}",
        format!("Sales Analysis: {}", input.display()).bold().cyan()
    );

    let table = io::read_table(input)?;
    let analyzer = Analyzer::new(&table).with_window(cfg.forecast.window);

    print_overview(&table);
    print_preview(&table, cfg.preview_rows);
    print_describe_table(&analyzer.describe());

    match analyzer.sales_summary() {
        Ok(summary) => print_sales_summary(summary.as_ref()),
        Err(e) => notice("Sales analysis", &e),
    }

    match analyzer.group_by(GroupKey::Product) {
        Ok(by_product) => {
            print_group_table(&by_product);
            print_group_bars(&by_product);
        }
        Err(e) => notice("Sales by Product", &e),
    }

    match analyzer.group_by(GroupKey::Region) {
        Ok(by_region) => print_group_table(&by_region),
        Err(e) => notice("Sales by Region", &e),
    }

    match analyzer.daily_buckets() {
        Ok(buckets) => {
            let growth = analyzer.growth_rate().ok();
            print_trend_table(&buckets, growth);
        }
        Err(e) => notice("Daily trend", &e),
    }

    let projection: Option<Forecast> = if forecast {
        match analyzer.forecast(cfg.forecast.horizon) {
            Ok(f) => {
                print_forecast_table(&f);
                Some(f).filter(|f| !f.is_empty())
            }
            Err(e) => {
                notice("Forecast", &e);
                None
            }
        }
    } else {
        None
    };

    let dir = cfg.output.dir.as_path();
    let size = (cfg.output.chart_width, cfg.output.chart_height);

    let mut charts = Vec::new();
    if visualize {
        match render_all(&analyzer, projection.as_ref(), dir, size) {
            Ok(set) => {
                for skipped in &set.skipped {
                    println!(
                        "{} {} skipped: {}",
                        "Notice:".yellow().bold(),
                        skipped.file,
                        skipped.reason
                    );
                }
                for file in &set.files {
                    println!("{} {}", "Chart:".green().bold(), file.display());
                }
                charts = set.files;
            }
            Err(e) => {
                warn!(error = %e, "chart rendering failed");
                eprintln!("{}: charts not rendered: {e}", "Warning".yellow());
            }
        }
    }

    if excel {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(EXCEL_REPORT);
        export_excel(&analyzer, &path)?;
        println!("{} {}", "Excel report:".green().bold(), path.display());
    }

    if pdf {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(PDF_REPORT);
        export_pdf(&analyzer, projection.as_ref(), &charts, &path)?;
        println!("{} {}", "PDF report:".green().bold(), path.display());
    }

    Ok(())
}

fn summary(input: &Path) -> Result<()> {
    let table = io::read_table(input)?;
    let analyzer = Analyzer::new(&table);

    println!("\n{}", "Quick Summary".bold().cyan());
    println!("{}", "=".repeat(40));
    println!("  Name:           {}", table.name());
    println!("  Records:        {}", table.len());

    match analyzer.sales_summary() {
        Ok(Some(s)) => {
            println!("  Total Sales:    {}", money(s.total));
            println!("  Average Sale:   {}", money(s.mean));
        }
        Ok(None) => println!("  Total Sales:    no data"),
        Err(e) => println!("  Total Sales:    {e}"),
    }

    for key in [GroupKey::Product, GroupKey::Region] {
        if let Ok(groups) = analyzer.group_by(key) {
            println!("  {:<15} {}", format!("{key}s:"), groups.groups.len());
        }
    }

    if let Ok(buckets) = analyzer.daily_buckets() {
        if let (Some(first), Some(last)) = (buckets.first(), buckets.last()) {
            println!("  Date Range:     {} to {}", first.date, last.date);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            visualize,
            excel,
            pdf,
            forecast,
            all,
            output_dir,
            horizon,
            config,
        } => analyze(
            &input,
            visualize || all,
            excel || all,
            pdf || all,
            forecast || all,
            output_dir,
            horizon,
            config,
        )?,

        Commands::Convert {
            input,
            output,
            pretty,
        } => {
            let table = io::read_table(&input)?;
            io::writer_for(&output, pretty)?.write(&table, &output)?;

            println!(
                "{} Converted {} -> {}",
                "Success:".green().bold(),
                input.display(),
                output.display()
            );
        }

        Commands::Summary { input } => summary(&input)?,
    }

    Ok(())
}
