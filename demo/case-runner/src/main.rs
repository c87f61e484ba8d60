//! Case runner: screens export cases from the command line

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::{ColoredString, Colorize};
use export_compliance::report::{red_flag_summary, render, screening_rows};
use export_compliance::{
    CaseFilter, CaseHistory, CaseInput, CaseStatus, ComplianceEngine, EngineConfig,
    ReportFormat, ReportPayload, ReportWriter,
};
use risk_engine::RiskLevel;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "case-runner", version, about = "Export control classification and transaction screening")]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(long, global = true, env = "EXPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Report confidences without jitter
    #[arg(long, global = true)]
    no_jitter: bool,

    /// Seed for the confidence jitter
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one case read from a TOML or JSON file
    Run {
        /// Case file
        input: PathBuf,

        /// Write the report into the configured report directory
        #[arg(long)]
        write: bool,

        /// Override the report directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Run the built-in demo cases and list the case history
    Demo {
        /// Only list cases with this status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Only list cases whose item name or destination contains this term
        #[arg(long)]
        search: Option<String>,

        /// Print Prometheus metrics after the run
        #[arg(long)]
        metrics: bool,
    },

    /// Print the loaded control tables
    Tables,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Summary,
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Clear,
    LicenseRequired,
    Blocked,
}

impl From<StatusArg> for CaseStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Clear => CaseStatus::Clear,
            StatusArg::LicenseRequired => CaseStatus::LicenseRequired,
            StatusArg::Blocked => CaseStatus::Blocked,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let engine = ComplianceEngine::new(config).context("failed to start compliance engine")?;

    match cli.command {
        Command::Run { ref input, write, ref output_dir } => {
            run_file(&engine, input, cli.format, write, output_dir.clone())
        }
        Command::Demo { status, ref search, metrics } => {
            let filter = CaseFilter {
                status: status.map(CaseStatus::from),
                search: search.clone(),
            };
            run_demo(&engine, cli.format, &filter, metrics)
        }
        Command::Tables => {
            print_tables(&engine);
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut config = config.with_env_overrides()?;

    if cli.no_jitter {
        config.classification.jitter_spread = 0.0;
    }
    if cli.seed.is_some() {
        config.classification.seed = cli.seed;
    }
    Ok(config)
}

fn read_case(path: &Path) -> Result<CaseInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read case {}", path.display()))?;

    let input = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        _ => bail!("case file must be .toml or .json: {}", path.display()),
    };
    Ok(input)
}

fn run_file(
    engine: &ComplianceEngine,
    input: &Path,
    format: OutputFormat,
    write: bool,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let case = read_case(input)?;
    let payload = engine.run_case(&case)?;
    print_payload(&payload, format)?;

    if write || output_dir.is_some() {
        let report = &engine.config().report;
        let writer = ReportWriter::new(output_dir.unwrap_or_else(|| report.output_dir.clone()))?;
        let metadata = writer.write(&payload, report.format)?;
        println!(
            "Report written: {} ({} bytes)",
            metadata.file_path.display(),
            metadata.file_size
        );
    }
    Ok(())
}

fn print_payload(payload: &ReportPayload, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Summary => print_summary(payload),
        OutputFormat::Text => print!("{}", render(payload, ReportFormat::Text)?),
        OutputFormat::Json => println!("{}", render(payload, ReportFormat::Json)?),
    }
    Ok(())
}

fn status_label(status: CaseStatus) -> ColoredString {
    match status {
        CaseStatus::Clear => status.as_str().green().bold(),
        CaseStatus::LicenseRequired => status.as_str().yellow().bold(),
        CaseStatus::Blocked => status.as_str().red().bold(),
    }
}

fn risk_label(level: RiskLevel) -> ColoredString {
    match level {
        RiskLevel::Low => level.as_str().green(),
        RiskLevel::Medium => level.as_str().yellow(),
        RiskLevel::High => level.as_str().bright_red(),
        RiskLevel::Critical => level.as_str().red().bold(),
    }
}

fn print_summary(payload: &ReportPayload) {
    println!(
        "\n{} {}  {}",
        "■".bold(),
        payload.case_id.as_str().bold(),
        status_label(payload.status())
    );
    println!("  品番・製品名: {}", payload.item_name);
    println!("  仕向地: {}", payload.destination);

    if payload.hits.is_empty() {
        println!("  該当候補: なし");
    } else {
        println!("  該当候補:");
        for hit in &payload.hits {
            println!(
                "    {} {} ({}) [{}]",
                hit.clause_id.as_str().cyan(),
                hit.title,
                hit.confidence_percent(),
                hit.matched_terms.join(", ")
            );
        }
    }

    for (label, flag, detail) in screening_rows(payload) {
        let flag = match flag {
            "CLEAR" => flag.green(),
            "WARNING" => flag.yellow(),
            _ => flag.red(),
        };
        println!("  {}: {} {}", label, flag, detail.as_str().dimmed());
    }
    if let Some(terms) = red_flag_summary(payload) {
        println!("  懸念キーワード: {}", terms);
    }

    println!(
        "  リスク: {} (スコア {}/100)",
        risk_label(payload.screening.overall_risk),
        payload.screening.risk_score
    );
    println!("  {}", payload.decision.recommendation);
    println!("  想定期間: {}", payload.decision.estimated_time);
}

fn demo_cases() -> Vec<CaseInput> {
    vec![
        CaseInput {
            hs_code: "8526.91".to_string(),
            key_params: "AES-256, 5-axis, 3.2 GHz".to_string(),
            spec_text: "Flight controller for UAV platforms with encrypted telemetry link".to_string(),
            destination: "ドイツ".to_string(),
            buyer: "ABC Trading Corp.".to_string(),
            end_user: "XYZ GmbH".to_string(),
            end_use: "農業用ドローンの飛行制御".to_string(),
            ..CaseInput::new("ART-40 Flight Controller")
        },
        CaseInput {
            key_params: "木製, 高さ調整".to_string(),
            destination: "ベトナム".to_string(),
            buyer: "Saigon Office Supply".to_string(),
            end_use: "オフィス家具として販売".to_string(),
            ..CaseInput::new("Office Chair OC-12")
        },
        CaseInput {
            spec_text: "GaN MMIC power amplifier, 6 GHz".to_string(),
            destination: "ロシア".to_string(),
            buyer: "Orbital Dynamics Lab".to_string(),
            end_user: "Orbital Dynamics Lab".to_string(),
            end_use: "通信インフラ".to_string(),
            ..CaseInput::new("PA-600 Amplifier")
        },
        CaseInput {
            spec_text: "5軸 CNC マシニングセンタ, servo drive".to_string(),
            destination: "北朝鮮".to_string(),
            end_user: "Acme Research Institute (Xland)".to_string(),
            end_use: "missile component machining".to_string(),
            ..CaseInput::new("MC-500 Machining Center")
        },
        CaseInput {
            spec_text: "Carbon fiber composite sheet".to_string(),
            destination: "シンガポール".to_string(),
            buyer: "Harbor Materials Pte.".to_string(),
            end_use: "民生用自転車フレーム".to_string(),
            ..CaseInput::new("CF-Sheet 2mm")
        },
    ]
}

fn run_demo(
    engine: &ComplianceEngine,
    format: OutputFormat,
    filter: &CaseFilter,
    show_metrics: bool,
) -> Result<()> {
    let history = CaseHistory::new();

    for (idx, case) in demo_cases().into_iter().enumerate() {
        // Distinct ids; generated ids only have second resolution
        let case = CaseInput {
            case_id: format!("{}-DEMO-{:03}", engine.config().case.id_prefix, idx + 1),
            ..case
        };
        let payload = engine.run_case(&case)?;
        print_payload(&payload, format)?;
        history.append(payload);
    }

    let stats = history.stats();
    println!("\n{}", "案件統計".bold());
    println!(
        "  合計 {}  {} {}  {} {}  {} {}",
        stats.total,
        status_label(CaseStatus::Clear),
        stats.clear,
        status_label(CaseStatus::LicenseRequired),
        stats.license_required,
        status_label(CaseStatus::Blocked),
        stats.blocked
    );

    let listed = history.search(filter);
    println!("\n{} ({}件)", "案件履歴".bold(), listed.len());
    for payload in &listed {
        println!(
            "  {}  {:<24} {:<8} {}",
            payload.case_id,
            payload.item_name,
            payload.destination,
            status_label(payload.status())
        );
    }

    if show_metrics {
        println!("\n{}", engine.metrics().gather_text()?);
    }
    Ok(())
}

fn print_tables(engine: &ComplianceEngine) {
    let tables = engine.tables();

    println!("{} ({})", "Matrix rules".bold(), tables.rules().len());
    for matrix_rule in tables.rules() {
        let rule = &matrix_rule.rule;
        println!(
            "  {} {:<8} {} / {} [{}, base {:.2}]",
            rule.clause_id.as_str().cyan(),
            rule.category,
            rule.title,
            rule.threshold,
            rule.risk_tier.as_str(),
            rule.base_confidence
        );
    }

    println!("\n{} ({})", "Sanctioned destinations".bold(), tables.sanctions().len());
    for entry in tables.sanctions() {
        println!("  {:<8} {:<8} {}", entry.destination, entry.severity.as_str(), entry.reason);
    }

    println!("\n{} ({})", "Watchlist".bold(), tables.watchlist().len());
    for entry in tables.watchlist() {
        println!(
            "  {} ({}) {} {} [{}]",
            entry.entity,
            entry.country,
            entry.risk_tier.as_str(),
            entry.reason,
            entry.last_updated
        );
    }

    println!("\n{} ({})", "End-use red flags".bold(), tables.red_flags().len());
    println!("  {}", tables.red_flags().join(", "));
}
