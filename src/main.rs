use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use progdash::config::DashboardConfig;
use progdash::dashboard::{Dashboard, DashboardView};
use progdash::error::ExportError;
use progdash::export::to_csv;
use progdash::filter::Criteria;
use progdash::format::{format_currency, format_number};
use progdash::logging::init_logging;
use progdash::synth::generate_portfolio;
use progdash::types::SourceFormat;

#[derive(Parser)]
#[command(name = "progdash")]
#[command(about = "Insurance programme portfolio: filter, aggregate, export", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print KPIs and grouped series for the filtered portfolio.
    Summary(SummaryArgs),
    /// Write the filtered portfolio as CSV.
    Export(ExportArgs),
    /// Write a synthetic portfolio as CSV.
    Generate(GenerateArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Portfolio file (.json or .csv). The built-in portfolio is used when absent.
    #[arg(long)]
    input: Option<PathBuf>,
    /// TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "")]
    text: String,
    #[arg(long, default_value = "all")]
    region: String,
    #[arg(long, default_value = "all")]
    ligne: String,
    #[arg(long, default_value = "all")]
    compliance: String,
}

#[derive(Args)]
struct SummaryArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Print the complete view model as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Destination path; defaults to the configured filtered-export filename.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long, default_value_t = 200)]
    rows: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Destination path; stdout when absent.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Command::Summary(args) => run_summary(args),
        Command::Export(args) => run_export(args),
        Command::Generate(args) => run_generate(args),
    }
}

fn load_dashboard(source: &SourceArgs) -> Result<Dashboard> {
    let config = match &source.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::canonical(),
    };
    let mut dashboard = Dashboard::new(config);

    if let Some(path) = &source.input {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let rows = dashboard
            .import(&text, SourceFormat::from_path(path))
            .with_context(|| format!("import of {} failed", path.display()))?;
        info!(path = %path.display(), rows, "portfolio loaded");
    }

    dashboard.set_criteria(Criteria {
        text: source.text.clone(),
        region: source.region.as_str().into(),
        ligne: source.ligne.as_str().into(),
        compliance: source.compliance.as_str().into(),
    });
    Ok(dashboard)
}

fn run_summary(args: SummaryArgs) -> Result<()> {
    let dashboard = load_dashboard(&args.source)?;
    let view = dashboard.view();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view, &dashboard.config().default_currency);
    }
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<()> {
    let dashboard = load_dashboard(&args.source)?;
    let doc = match dashboard.export_filtered(None) {
        Ok(doc) => doc,
        Err(ExportError::Empty) => {
            info!("no rows match the filters, nothing exported");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let path = args.output.unwrap_or_else(|| PathBuf::from(&doc.filename));
    write_output(&path, &doc.content)?;
    info!(path = %path.display(), rows = dashboard.filtered().len(), "export written");
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let rows = generate_portfolio(args.rows, args.seed);
    let csv = to_csv(&rows)?;
    match args.output {
        Some(path) => {
            write_output(&path, &csv)?;
            info!(path = %path.display(), rows = rows.len(), seed = args.seed, "synthetic portfolio written");
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))
}

fn print_view(view: &DashboardView, ccy: &str) {
    let k = &view.kpis;
    println!(
        "=== Portefeuille ({} enregistrements, {} pays, {} entités) ===",
        view.filtered.len(),
        view.country_count,
        view.entity_count
    );
    println!("  Prime totale:         {:>20}", format_currency(k.total_prime, ccy));
    println!("  Limites agrégées:     {:>20}", format_currency(k.total_limite, ccy));
    println!("  Rétentions cumulées:  {:>20}", format_currency(k.total_retention, ccy));
    println!("  Coût sinistres:       {:>20}", format_currency(k.total_sinistres, ccy));
    println!("  S/P:                  {:>19.1}%", k.loss_ratio() * 100.0);

    println!("\n=== Prime par ligne ===");
    println!("{:<20} | {:>18} | {:>18} | {:>18}", "Ligne", "Prime", "Sinistres", "Rétentions");
    println!("{}", "-".repeat(20 + 3 + 18 + 3 + 18 + 3 + 18));
    for g in &view.by_line {
        println!(
            "{:<20} | {:>18} | {:>18} | {:>18}",
            g.name,
            format_currency(g.prime, ccy),
            format_currency(g.sinistres, ccy),
            format_currency(g.retentions, ccy)
        );
    }

    println!("\n=== Prime & sinistres par pays (top {}) ===", view.by_country.len());
    for g in &view.by_country {
        println!(
            "{:<20} | {:>18} | {:>18}",
            g.name,
            format_currency(g.prime, ccy),
            format_currency(g.sinistres, ccy)
        );
    }

    println!("\n=== Sinistres par année ===");
    println!("{:>6} | {:>18} | {:>10}", "Année", "Sévérité", "Fréquence");
    for y in &view.by_year {
        println!(
            "{:>6} | {:>18} | {:>10}",
            y.annee,
            format_currency(y.sinistres, ccy),
            format_number(y.frequence as f64)
        );
    }

    println!("\n=== Limite / prime par risque ===");
    for p in &view.radar {
        println!(
            "{:<20} | {:>18} | {:>18}",
            p.risque,
            format_currency(p.limite, ccy),
            format_currency(p.prime, ccy)
        );
    }

    println!("\n=== Flux région → ligne → assureur ===");
    for l in &view.flow.links {
        println!(
            "{:<28} → {:<28} {:>18}",
            view.flow.nodes[l.source].name,
            view.flow.nodes[l.target].name,
            format_currency(l.value, ccy)
        );
    }
}
