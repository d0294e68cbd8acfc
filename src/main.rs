use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use digimv_prospect::config::Config;
use digimv_prospect::domain::{CareType, OrganizationRecord};
use digimv_prospect::export;
use digimv_prospect::logging;
use digimv_prospect::pipeline::processing::{distinct_provinces, DatasetSummary, FilterSpec};
use digimv_prospect::pipeline::{IngestOutcome, MasterDataset, PartInput, Pipeline};

const CONFIG_ENV: &str = "DIGIMV_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Parser)]
#[command(name = "digimv_prospect")]
#[command(about = "Build, enrich and filter DigiMV healthcare-provider datasets")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to config.toml (falls back to DIGIMV_CONFIG, then ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the master dataset from DigiMV export parts
    Build {
        /// Workbook parts, in upload order
        #[arg(long = "part", required = true)]
        parts: Vec<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Re-enrich a previously exported master CSV
    Reenrich {
        /// Exported master file
        #[arg(long)]
        master: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Reference geography file (postcode, lat, lon, provincie)
    #[arg(long)]
    geo: Option<PathBuf>,

    /// JSON filter specification
    #[arg(long)]
    filter: Option<PathBuf>,

    /// Free-text search, overrides the filter file's search
    #[arg(long)]
    search: Option<String>,

    /// Minimum revenue in millions
    #[arg(long)]
    revenue_min: Option<f64>,

    /// Maximum revenue in millions
    #[arg(long)]
    revenue_max: Option<f64>,

    /// Write the filtered records as CSV; without a path a timestamped name is used
    #[arg(long)]
    export: Option<Option<PathBuf>>,
}

fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from))
        .or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        });

    match path {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn load_filter(common: &CommonArgs) -> Result<FilterSpec> {
    let mut spec = match &common.filter {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read filter file {}", path.display()))?;
            FilterSpec::from_json(&json)
                .with_context(|| format!("Invalid filter file {}", path.display()))?
        }
        None => FilterSpec::default(),
    };

    if let Some(search) = &common.search {
        spec.search = Some(search.clone());
    }
    if let Some(min) = common.revenue_min {
        spec.revenue_min = Some(min * 1_000_000.0);
    }
    if let Some(max) = common.revenue_max {
        spec.revenue_max = Some(max * 1_000_000.0);
    }
    Ok(spec)
}

fn load_reference(pipeline: &mut Pipeline, geo: Option<&Path>) -> Result<()> {
    if let Some(path) = geo {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read reference file {}", path.display()))?;
        let table = pipeline.load_reference(&bytes);
        println!(
            "🗺️  Reference: {} postcodes with province, {} with coordinates",
            table.province_count(),
            table.coordinate_count()
        );
    }
    Ok(())
}

fn print_summary(title: &str, records: &[&OrganizationRecord]) {
    let summary = DatasetSummary::of(records.iter().copied());

    println!("\n📊 {}", title);
    println!("   Organizations: {}", summary.total);
    for care_type in CareType::ALL {
        println!("   {}: {}", care_type.label(), summary.count_for(care_type));
    }
    println!(
        "   Total revenue: €{:.2} bn",
        summary.total_revenue / 1_000_000_000.0
    );
    println!("   Total FTE: {:.0}", summary.total_fte);
    println!("   Reliable FTE data: {}", summary.reliable_fte);
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!("\n⚠️  Warnings:");
    for warning in warnings {
        println!("   - {}", warning);
    }
}

fn filter_and_export(
    pipeline: &Pipeline,
    dataset: &MasterDataset,
    common: &CommonArgs,
) -> Result<()> {
    let spec = load_filter(common)?;
    let provinces = distinct_provinces(&dataset.records);
    info!(provinces = provinces.len(), "Provinces available for filtering");

    let filtered = pipeline.filter(dataset, &spec);
    print_summary("Filtered result", &filtered);
    println!(
        "   Result: {} of {} organizations",
        filtered.len(),
        dataset.records.len()
    );

    if let Some(target) = &common.export {
        let path = target.clone().unwrap_or_else(|| {
            PathBuf::from(export::default_export_name(&chrono::Local::now()))
        });
        let written = export::export_to_path(&path, filtered.iter().copied())
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        println!("\n💾 Exported {} records to {}", written, path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref())?;
    let _guard = logging::init_logging(&config.logging.directory);
    let mut pipeline = Pipeline::new(&config);

    match cli.command {
        Commands::Build { parts, common } => {
            println!("🔄 Building master dataset from {} part(s)...", parts.len());
            load_reference(&mut pipeline, common.geo.as_deref())?;

            let mut inputs = Vec::with_capacity(parts.len());
            for path in &parts {
                let bytes = fs::read(path)
                    .with_context(|| format!("Failed to read part {}", path.display()))?;
                inputs.push(PartInput::new(path.display().to_string(), bytes));
            }

            match pipeline.ingest(&inputs) {
                IngestOutcome::Loaded {
                    dataset, warnings, ..
                } => {
                    println!(
                        "✅ {} parts loaded, {} rows assembled, {} without a recognized care type",
                        dataset.parts_loaded, dataset.assembled, dataset.discarded
                    );
                    print_warnings(&warnings);
                    let all: Vec<&OrganizationRecord> = dataset.records.iter().collect();
                    print_summary("Master dataset", &all);
                    filter_and_export(&pipeline, &dataset, &common)?;
                }
                IngestOutcome::NoParts { warnings } => {
                    warn!("No data loaded");
                    println!("❌ None of the parts could be loaded");
                    print_warnings(&warnings);
                }
            }
        }
        Commands::Reenrich { master, common } => {
            println!("🔄 Re-enriching master file {}...", master.display());
            load_reference(&mut pipeline, common.geo.as_deref())?;

            let file = fs::File::open(&master)
                .with_context(|| format!("Failed to open master file {}", master.display()))?;
            let master_file = export::read_master_csv(file)
                .with_context(|| format!("Failed to read master file {}", master.display()))?;
            let dataset = pipeline.reenrich(master_file);

            let all: Vec<&OrganizationRecord> = dataset.records.iter().collect();
            print_summary("Master dataset", &all);
            filter_and_export(&pipeline, &dataset, &common)?;
        }
    }
    Ok(())
}
