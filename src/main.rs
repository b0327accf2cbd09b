use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use std::io;
use std::path::PathBuf;
use tablero::chart::ChartSpec;
use tablero::config::{FileConfig, Settings};
use tablero::dataset::{sample_records, Dimension};
use tablero::db::Database;
use tablero::{Dashboard, DashboardUpdate, FilterSelection, Loader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tablero")]
#[command(author, version, about = "Analytics dashboard: filter by city, partner and region")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the interactive dashboard
    Serve {
        /// Address to bind (default from config, 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default: PORT or 8050)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Compute one dashboard update and print it
    Summary {
        /// Accept this city (repeatable)
        #[arg(long)]
        ciudad: Vec<String>,

        /// Accept this partner (repeatable)
        #[arg(long)]
        aliado: Vec<String>,

        /// Accept this region (repeatable)
        #[arg(long)]
        region: Vec<String>,

        /// Print the update as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a table in a SQLite file and fill it with the sample rows
    Seed {
        /// Database file (created if missing)
        db: PathBuf,

        /// Table name
        #[arg(long, default_value = "mi_tabla")]
        table: String,
    },

    /// Set up .tablero/ in the current directory
    Init,

    /// Generate shell completions
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_settings() -> Result<Settings> {
    let file = FileConfig::load().context("Failed to read configuration")?;
    let settings = Settings::from_env(&file).context("Invalid configuration")?;
    init_tracing(settings.debug);
    info!(
        target_db = %settings.target,
        table = %settings.table,
        production = settings.production,
        "configuration resolved"
    );
    Ok(settings)
}

fn load_dashboard(settings: &Settings) -> Result<Dashboard> {
    let loader = Loader::from_settings(settings);
    let dataset = loader
        .load()
        .with_context(|| format!("No usable dataset (tried: {})", loader.source_names().join(", ")))?;
    Ok(Dashboard::new(dataset))
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve { host, port } => {
            let settings = load_settings()?;
            let dashboard = load_dashboard(&settings)?;
            let host = host.unwrap_or_else(|| settings.host.clone());
            let port = port.unwrap_or(settings.port);

            eprintln!("\n{}", "📊 Tablero".green().bold());
            eprintln!("   Dashboard: http://{}:{}", host, port);
            eprintln!("   Press Ctrl+C to stop\n");

            tablero::serve::start_dashboard_server(&host, port, &dashboard)
                .context("Server error")?;
        }

        Command::Summary {
            ciudad,
            aliado,
            region,
            json,
        } => {
            let settings = load_settings()?;
            let dashboard = load_dashboard(&settings)?;

            let mut selection = FilterSelection::none();
            for (dimension, values) in [
                (Dimension::Ciudad, &ciudad),
                (Dimension::Aliado, &aliado),
                (Dimension::Region, &region),
            ] {
                for value in values {
                    selection.insert(dimension, value);
                }
            }

            let update = dashboard.render(&selection);
            if json {
                println!("{}", serde_json::to_string_pretty(&update)?);
            } else {
                print_summary(&dashboard, &update);
            }
        }

        Command::Seed { db, table } => {
            init_tracing(false);
            let database = Database::create(&db)
                .with_context(|| format!("Could not open {}", db.display()))?;
            let rows = database
                .seed_table(&table, &sample_records())
                .with_context(|| format!("Could not seed table {}", table))?;
            println!(
                "{} {} rows into {} ({})",
                "Seeded".green(),
                rows,
                table,
                database.path().display()
            );
        }

        Command::Init => {
            init_tracing(false);
            let cwd = std::env::current_dir().context("Could not get current directory")?;
            tablero::init::init_project(&cwd).map_err(anyhow::Error::msg)?;
        }

        Command::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "tablero", &mut io::stdout());
        }
    }

    Ok(())
}

fn print_summary(dashboard: &Dashboard, update: &DashboardUpdate) {
    let dataset = dashboard.dataset();
    println!(
        "{} source: {} ({} records, {} matched)",
        "Tablero".bold(),
        dataset.source(),
        dataset.len(),
        update.matched
    );
    if !update.computed {
        println!("{}", "Recompute failed; showing defaults".yellow());
    }
    println!("{}", "─".repeat(50));
    println!("  {:<26} {}", "Porcentaje de Análisis", update.cards.percentage.red().bold());
    println!("  {:<26} {}", "Público Objetivo", update.cards.target_total.blue().bold());
    println!("  {:<26} {}", "Cargas en Presenze", update.cards.analyzed_total.green().bold());

    for chart in [
        &update.charts.by_city,
        &update.charts.by_partner,
        &update.charts.partner_share,
    ] {
        print_chart(chart);
    }
}

fn print_chart(chart: &ChartSpec) {
    println!("\n{}", chart.title.bold());
    if chart.points.is_empty() {
        println!("  {}", "(no data)".dimmed());
        return;
    }
    for point in &chart.points {
        let value = point
            .label
            .clone()
            .unwrap_or_else(|| format!("{}", point.value));
        println!("  {:<24} {}", point.category, value);
    }
}
