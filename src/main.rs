use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use childcare_graph::config::parse_entity_types;
use childcare_graph::{
    count_source_rows, export_csv, import_rows, load_csv, load_source_rows, materialize,
    open_database, setup_source_table, Config, GraphSink, MaterializeReport, MemorySink,
    SinkFormat, TableSink, TripleSink, VERSION,
};

#[derive(Parser)]
#[command(name = "childcare-graph")]
#[command(version = VERSION)]
#[command(about = "Materialize childcare facility filings into a deduplicated entity graph")]
struct Cli {
    /// SQLite database (overrides CHILDCARE_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Source CSV (overrides CHILDCARE_CSV)
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Export directory (overrides CHILDCARE_EXPORT_DIR)
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    /// Comma-separated entity types (overrides CHILDCARE_ENTITY_TYPES)
    #[arg(long, global = true)]
    entity_types: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import the source CSV into the childcare_facilities table
    Import,

    /// Build the entity graph from the imported rows
    Materialize {
        #[arg(long, value_enum)]
        sink: Option<SinkFormat>,
        /// Resolve everything in memory without touching the output tables
        #[arg(long)]
        dry_run: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the materialized graph to CSV files
    Export {
        #[arg(long, value_enum)]
        sink: Option<SinkFormat>,
    },

    /// Import, materialize and export in one go
    Run {
        #[arg(long, value_enum)]
        sink: Option<SinkFormat>,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;

    // CLI flags win over the environment
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    if let Some(csv) = cli.csv {
        config.csv_path = csv;
    }
    if let Some(dir) = cli.export_dir {
        config.export_dir = dir;
    }
    if let Some(types) = cli.entity_types {
        config.entity_types = parse_entity_types(&types).context("Invalid --entity-types")?;
    }

    match cli.command {
        Commands::Import => run_import(&config),
        Commands::Materialize {
            sink,
            dry_run,
            json,
        } => {
            config.sink = sink.unwrap_or(config.sink);
            let report = run_materialize(&config, dry_run)?;
            print_report(&report, json)
        }
        Commands::Export { sink } => {
            config.sink = sink.unwrap_or(config.sink);
            run_export(&config)
        }
        Commands::Run { sink, json } => {
            config.sink = sink.unwrap_or(config.sink);
            run_import(&config)?;
            let report = run_materialize(&config, false)?;
            print_report(&report, json)?;
            run_export(&config)
        }
    }
}

fn run_import(config: &Config) -> Result<()> {
    println!("🗄️  Import - CSV → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load CSV
    println!("\n📂 Loading CSV...");
    let rows = load_csv(&config.csv_path)?;
    println!("✓ Loaded {} facility rows from {}", rows.len(), config.csv_path.display());

    // 2. Replace source table
    println!("\n🔧 Setting up source table...");
    let mut conn = Connection::open(&config.database_path)
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    setup_source_table(&conn)?;
    println!("✓ childcare_facilities recreated");

    // 3. Insert rows
    println!("\n💾 Inserting rows...");
    import_rows(&mut conn, &rows)?;

    // 4. Verify count
    let count = count_source_rows(&conn)?;
    println!("✓ Database contains {} facility rows", count);

    Ok(())
}

fn run_materialize(config: &Config, dry_run: bool) -> Result<MaterializeReport> {
    let conn = open_database(&config.database_path)?;
    let rows = load_source_rows(&conn).context("Run `childcare-graph import` first")?;
    tracing::info!(
        rows = rows.len(),
        sink = %config.sink,
        dry_run,
        "loaded source rows"
    );

    if dry_run {
        return materialize_into(&rows, MemorySink::new(), config);
    }

    match config.sink {
        SinkFormat::Tables => materialize_into(&rows, TableSink::new(&conn), config),
        SinkFormat::Triples => materialize_into(&rows, TripleSink::new(&conn), config),
    }
}

fn materialize_into<S: GraphSink>(
    rows: &[childcare_graph::SourceRow],
    sink: S,
    config: &Config,
) -> Result<MaterializeReport> {
    let (report, _) = materialize(rows, sink, &config.entity_types)?;
    Ok(report)
}

fn run_export(config: &Config) -> Result<()> {
    println!("\n📤 Exporting {} to {}...", config.sink, config.export_dir.display());

    let conn = open_database(&config.database_path)?;
    let files = export_csv(&conn, config.sink, &config.export_dir)?;
    for file in &files {
        println!("✓ {:<20} {:>8} rows → {}", file.table, file.rows, file.path.display());
    }

    Ok(())
}

fn print_report(report: &MaterializeReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("🕸️  Graph Materialization");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ Rows processed:        {}", report.rows_processed);
    println!("✓ Duplicate rows:        {}", report.duplicate_rows);
    println!("✓ Entities written:      {}", report.entities_written);
    println!("✓ Attributes written:    {}", report.attributes_written);
    println!("✓ Relationships written: {}", report.relationships_written);

    if !report.entities_by_type.is_empty() {
        println!("\n📊 Entities by type:");
        for (entity_type, count) in &report.entities_by_type {
            println!("   {:<15} {}", entity_type.name(), count);
        }
    }

    if report.skipped.is_empty() {
        println!("\n🎉 No entities skipped");
    } else {
        println!("\n⚠️  Skipped entities ({} total):", report.total_skipped());
        for (reason, count) in &report.skipped {
            println!("   {:<50} {}", reason.to_string(), count);
        }
    }

    Ok(())
}
