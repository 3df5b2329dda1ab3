use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use pmmon_service::config::{Config, DEFAULT_CONFIG_PATH};
use pmmon_service::dev_mode::FixtureSource;
use pmmon_service::ingest::AirQualitySource;
use pmmon_service::ingest::airkorea::AirKoreaClient;
use pmmon_service::logging::init_logging;
use pmmon_service::present::{self, html, table};
use pmmon_service::regions::{self, REGION_REGISTRY, Region};
use pmmon_service::session::{PipelineError, Session, UpdateReport};
use pmmon_service::verify;

#[derive(Parser)]
#[command(name = "pmmon", version, about = "Real-time PM10 map for Korean regions (AirKorea)")]
struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Replay recorded responses from this directory instead of calling the API
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the selectable regions
    Regions,
    /// Fetch one region, print the summary and write the map page
    Show {
        /// Korean label or English name; defaults to map.default_region
        #[arg(short, long)]
        region: Option<String>,
        /// HTML output path; defaults to map.output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Select regions and refresh from stdin
    Interactive {
        #[arg(short, long)]
        region: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check both endpoints for one or all regions and print a JSON report
    Verify {
        /// Only this region (all regions when omitted)
        #[arg(short, long)]
        region: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = Config::load(&config_path, cli.config.is_some())?;
    init_logging(&config.logging, cli.verbose).map_err(|e| e.to_string())?;

    match cli.command {
        Command::Regions => {
            for region in REGION_REGISTRY {
                println!(
                    "{}\t{}\t{:.4}, {:.4}",
                    region.name, region.english_name, region.center.latitude, region.center.longitude
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { region, output } => {
            let source = build_source(&config, cli.fixtures.as_deref())?;
            let region = select_region(region.as_deref(), &config)?;
            let output = output.unwrap_or_else(|| PathBuf::from(&config.map.output));

            let mut session = Session::new(config.map.clone());
            let outcome = session.update(source.as_ref(), region, true);
            Ok(if display_outcome(&session, outcome, &output)? {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Interactive { region, output } => {
            let source = build_source(&config, cli.fixtures.as_deref())?;
            let region = select_region(region.as_deref(), &config)?;
            let output = output.unwrap_or_else(|| PathBuf::from(&config.map.output));
            interactive(source.as_ref(), Session::new(config.map.clone()), region, &output)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify { region } => {
            let source = build_source(&config, cli.fixtures.as_deref())?;
            let regions: Vec<&Region> = match region {
                Some(name) => vec![lookup_region(&name)?],
                None => REGION_REGISTRY.iter().collect(),
            };
            let report = verify::run_verification(source.as_ref(), &regions);
            println!("{}", serde_json::to_string_pretty(&report)?);
            eprintln!(
                "{}/{} regions working ({:.1}%)",
                report.summary.working,
                report.summary.total,
                verify::success_rate(&report.summary)
            );
            Ok(if report.summary.failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
    }
}

fn build_source(config: &Config, fixtures: Option<&Path>) -> Result<Box<dyn AirQualitySource>, Box<dyn Error>> {
    let source: Box<dyn AirQualitySource> = match fixtures {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "replaying recorded responses");
            Box::new(FixtureSource::new(dir))
        }
        None => Box::new(AirKoreaClient::new(config.api.clone())?),
    };
    Ok(source)
}

fn lookup_region(name: &str) -> Result<&'static Region, Box<dyn Error>> {
    regions::find_region(name).ok_or_else(|| {
        format!("unknown region '{}'; try one of: {}", name, regions::all_region_names().join(", ")).into()
    })
}

fn select_region(requested: Option<&str>, config: &Config) -> Result<&'static Region, Box<dyn Error>> {
    lookup_region(requested.unwrap_or(&config.map.default_region))
}

/// Prints the outcome of an update and, when a snapshot is held, writes
/// the map page. Returns `false` if the update failed.
fn display_outcome(
    session: &Session,
    outcome: Result<Option<UpdateReport>, PipelineError>,
    output: &Path,
) -> Result<bool, Box<dyn Error>> {
    let (ok, notices) = match outcome {
        Ok(Some(report)) => {
            println!("{}", report.success_message());
            let warnings = report.warnings();
            for warning in &warnings {
                eprintln!("⚠ {}", warning);
            }
            (true, warnings)
        }
        Ok(None) => (true, Vec::new()),
        Err(err) => {
            eprintln!("{}", err.user_message());
            (false, Vec::new())
        }
    };

    println!();
    println!("{}", table::metrics_lines(&session.summary_metrics()));

    match session.snapshot() {
        Some(snapshot) => {
            println!("{}", table::station_table(&snapshot.result));
            println!("📅 최신 측정시간: {}", snapshot.result.latest_timestamp);
            for entry in present::legend() {
                println!("  {}", entry.describe());
            }

            let page = html::render_map_page(&snapshot.view, &snapshot.metrics(), &present::legend(), &notices)?;
            std::fs::write(output, page)?;
            println!("🗺  {}", output.display());
        }
        None => {
            println!("데이터를 불러오지 못했습니다. 지역을 다시 선택하거나 새로고침하세요.");
        }
    }
    Ok(ok)
}

fn interactive(
    source: &dyn AirQualitySource,
    mut session: Session,
    initial: &'static Region,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut selected = initial;
    let outcome = session.update(source, selected, false);
    display_outcome(&session, outcome, output)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\n지역 선택 (Enter: 새로고침, q: 종료) [{}]> ", selected.name);
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let refresh = match line.trim() {
            "q" | "quit" => break,
            "" | "r" => true,
            name => match regions::find_region(name) {
                Some(region) => {
                    selected = region;
                    false
                }
                None => {
                    eprintln!("알 수 없는 지역: {}", name);
                    continue;
                }
            },
        };

        let outcome = session.update(source, selected, refresh);
        display_outcome(&session, outcome, output)?;
    }
    Ok(())
}
