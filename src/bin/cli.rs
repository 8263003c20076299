//! papersplit CLI - split research PDFs into labeled sections
//!
//! Usage: papersplit-cli [OPTIONS] <COMMAND>
//!
//! Organizes a PDF (or plain text) into sections and requests summaries or
//! entity/dependency analysis for them from the analysis service.
//! Supports JSON output for scripting.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use futures::future::join_all;
use papersplit_lib::enrichment::{EnrichmentKind, EnrichmentSession};
use papersplit_lib::papers::pdf_extractor::{self, PageLayout};
use papersplit_lib::papers::section_classifier::classify_with_limit;
use papersplit_lib::papers::section_parser::{organize_with_strategy, Strategy};
use papersplit_lib::papers::Section;
use papersplit_lib::{settings, utils, AnalysisClient, PaperError};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "papersplit-cli")]
#[command(version, about = "Split research PDFs into sections and enrich them", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON for scripting
    #[arg(long, global = true)]
    json: bool,

    /// Analysis service URL (overrides settings and PAPERSPLIT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Where the sections come from
#[derive(clap::Args, Clone)]
struct InputArgs {
    /// PDF file (or plain text file with --text)
    file: PathBuf,

    /// Treat FILE as already-extracted plain text
    #[arg(long)]
    text: bool,

    /// Segmentation strategy
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    strategy: StrategyArg,

    /// Page layout for PDF extraction (default: from settings, initially flatten)
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and print the sections of a document
    Organize {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Classify heading candidates
    Classify {
        /// Lines to classify
        #[arg(required = true)]
        lines: Vec<String>,
    },

    /// Generate summaries for sections (all sections if none given)
    Summarize {
        #[command(flatten)]
        input: InputArgs,

        /// Section id to summarize (repeatable)
        #[arg(long = "section")]
        sections: Vec<u32>,
    },

    /// Extract entities and dependencies for sections (all sections if none given)
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Section id to analyze (repeatable)
        #[arg(long = "section")]
        sections: Vec<u32>,
    },

    /// Check that the analysis service is reachable
    Health,

    /// Show or change settings
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current settings
    Show,
    /// Set the analysis service base URL (empty resets to default)
    SetApiUrl { url: String },
    /// Set organizer thresholds
    SetThresholds {
        /// Sections with this many characters or fewer are dropped
        #[arg(long)]
        min_section: Option<usize>,
        /// Heading candidates must be shorter than this
        #[arg(long)]
        max_heading: Option<usize>,
    },
    /// Set the PDF page layout
    SetLayout {
        #[arg(value_enum)]
        layout: LayoutArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum StrategyArg {
    Auto,
    Numbered,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => Strategy::Auto,
            StrategyArg::Numbered => Strategy::Numbered,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum LayoutArg {
    Lines,
    Flatten,
}

impl From<LayoutArg> for PageLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Lines => PageLayout::Lines,
            LayoutArg::Flatten => PageLayout::Flatten,
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run_cli(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_cli(cli: Cli) -> Result<(), String> {
    // Handle completions first (no settings or network needed)
    if let Commands::Completions { shell } = &cli.command {
        generate(*shell, &mut Cli::command(), "papersplit-cli", &mut std::io::stdout());
        return Ok(());
    }

    settings::init(settings::default_config_dir());

    match cli.command {
        Commands::Organize { input } => handle_organize(&input, cli.json),
        Commands::Classify { lines } => handle_classify(&lines, cli.json),
        Commands::Summarize { input, sections } => {
            handle_enrich(EnrichmentKind::Summary, &input, sections, cli.api_url, cli.json).await
        }
        Commands::Analyze { input, sections } => {
            handle_enrich(EnrichmentKind::Analysis, &input, sections, cli.api_url, cli.json).await
        }
        Commands::Health => handle_health(cli.api_url, cli.json).await,
        Commands::Config { cmd } => handle_config(cmd, cli.json),
        Commands::Completions { .. } => Ok(()),
    }
}

// ============================================================================
// Input
// ============================================================================

fn read_text(path: &Path, is_text: bool, layout: PageLayout) -> Result<String, PaperError> {
    if is_text {
        return Ok(fs::read_to_string(path)?);
    }
    let bytes = pdf_extractor::load_pdf(path)?;
    pdf_extractor::extract_text_from_pdf(&bytes, layout)
}

fn load_sections(input: &InputArgs) -> Result<Vec<Section>, String> {
    let layout = input.layout.map(PageLayout::from).unwrap_or_else(settings::get_page_layout);
    let text = read_text(&input.file, input.text, layout).map_err(|e| e.to_string())?;
    let config = settings::get_organizer_config();

    Ok(organize_with_strategy(&text, input.strategy.into(), &config))
}

fn make_client(api_url: Option<String>) -> Result<AnalysisClient, String> {
    let client = match api_url {
        Some(url) => AnalysisClient::with_timeout(&url, settings::get_request_timeout()),
        None => AnalysisClient::from_settings(),
    };
    client.map_err(|e| e.to_string())
}

// ============================================================================
// Commands
// ============================================================================

fn handle_organize(input: &InputArgs, json: bool) -> Result<(), String> {
    let sections = load_sections(input)?;

    if json {
        print_json(&sections)?;
    } else {
        println!("Extracted {} sections from {}", sections.len(), input.file.display());
        print_sections(&sections);
    }
    Ok(())
}

fn handle_classify(lines: &[String], json: bool) -> Result<(), String> {
    let max_heading = settings::get_organizer_config().max_heading_chars;

    let results: Vec<(String, Option<&'static str>)> = lines
        .iter()
        .map(|line| {
            let line = line.trim();
            (line.to_string(), classify_with_limit(line, max_heading).map(|t| t.as_str()))
        })
        .collect();

    if json {
        let items: Vec<serde_json::Value> = results
            .iter()
            .map(|(line, section_type)| serde_json::json!({"line": line, "section_type": section_type}))
            .collect();
        print_json(&items)?;
    } else {
        for (line, section_type) in &results {
            println!("{:20} {}", section_type.unwrap_or("-"), line);
        }
    }
    Ok(())
}

async fn handle_enrich(
    kind: EnrichmentKind,
    input: &InputArgs,
    requested: Vec<u32>,
    api_url: Option<String>,
    json: bool,
) -> Result<(), String> {
    let sections = load_sections(input)?;
    if sections.is_empty() {
        return Err(format!("No sections found in {}", input.file.display()));
    }

    let session = EnrichmentSession::new(make_client(api_url)?, sections);

    // Dedupe: the session rejects a second concurrent request for the same section
    let mut ids = if requested.is_empty() { session.section_ids() } else { requested };
    ids.sort_unstable();
    ids.dedup();

    let session_ref = &session;
    let outcomes = join_all(ids.iter().map(|&id| async move {
        let result = match kind {
            EnrichmentKind::Summary => session_ref.summarize(id).await.map(|_| ()),
            EnrichmentKind::Analysis => session_ref.analyze(id).await.map(|_| ()),
        };
        (id, result)
    }))
    .await;

    let mut failed = 0;
    for (id, result) in &outcomes {
        let title = session
            .section(*id)
            .map(|s| s.title)
            .unwrap_or_else(|| format!("section {}", id));
        match result {
            Ok(()) => eprintln!("[✓] {} complete for \"{}\"", kind, title),
            Err(e) => {
                eprintln!("[✗] \"{}\": {}", title, e);
                failed += 1;
            }
        }
    }

    let enriched: Vec<Section> = session
        .into_sections()
        .into_iter()
        .filter(|s| ids.contains(&s.id))
        .collect();

    if json {
        print_json(&enriched)?;
    } else {
        print_sections(&enriched);
    }

    if failed == outcomes.len() {
        return Err(format!("All {} {} request(s) failed", failed, kind));
    }
    Ok(())
}

async fn handle_health(api_url: Option<String>, json: bool) -> Result<(), String> {
    let client = make_client(api_url)?;
    let ok = client.health().await;

    if json {
        print_json(&health_report(client.base_url(), ok))?;
    } else if ok {
        println!("API server reachable at {}", client.base_url());
    }

    if ok {
        Ok(())
    } else {
        Err(format!("API server not reachable at {}", client.base_url()))
    }
}

fn health_report(url: &str, healthy: bool) -> serde_json::Value {
    serde_json::json!({"url": url, "healthy": healthy})
}

fn handle_config(cmd: ConfigCommands, json: bool) -> Result<(), String> {
    match cmd {
        ConfigCommands::Show => {
            let current = settings::current();
            let path = settings::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "not initialized".to_string());

            if json {
                let mut value = serde_json::to_value(&current).map_err(|e| e.to_string())?;
                value["effective_api_url"] = serde_json::Value::String(settings::get_api_base_url());
                value["config_path"] = serde_json::Value::String(path);
                print_json(&value)?;
            } else {
                println!("config-path:       {}", path);
                println!("api-url:           {}", settings::get_api_base_url());
                println!("min-section-chars: {}", current.min_section_chars);
                println!("max-heading-chars: {}", current.max_heading_chars);
                println!("request-timeout:   {}s", current.request_timeout_secs);
                println!("page-layout:       {}", current.page_layout.as_str());
            }
        }
        ConfigCommands::SetApiUrl { url } => {
            settings::set_api_base_url(url).map_err(|e| e.to_string())?;
            println!("API URL saved");
        }
        ConfigCommands::SetThresholds { min_section, max_heading } => {
            if min_section.is_none() && max_heading.is_none() {
                return Err("Nothing to set: pass --min-section and/or --max-heading".to_string());
            }
            settings::set_organizer_thresholds(min_section, max_heading).map_err(|e| e.to_string())?;
            println!("Thresholds saved");
        }
        ConfigCommands::SetLayout { layout } => {
            settings::set_page_layout(layout.into()).map_err(|e| e.to_string())?;
            println!("Page layout saved");
        }
    }
    Ok(())
}

// ============================================================================
// Output
// ============================================================================

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let out = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", out);
    Ok(())
}

fn print_sections(sections: &[Section]) {
    for section in sections {
        println!();
        println!("[{}] {} ({} chars)", section.id, section.title, section.content_len());
        println!("    {}", utils::preview(&section.content, 240));

        if let Some(summary) = &section.summary {
            println!("  Summary:");
            println!("    {}", summary);
        }
        if let Some(entities) = &section.entities {
            println!("  Entities ({}):", entities.len());
            for entity in entities {
                println!("    {} [{}] {}..{}", entity.text, entity.label, entity.start, entity.end);
            }
        }
        if let Some(dependencies) = &section.dependencies {
            println!("  Dependencies ({}):", dependencies.len());
            for dep in dependencies {
                println!(
                    "    {} ({}) --{}--> {} ({})",
                    dep.text, dep.dep_pos, dep.dep, dep.head, dep.head_pos
                );
            }
        }
    }
}
