//! Command-line entrypoint: argument parsing, progress display, artifact
//! writing. Everything pipeline-shaped lives in serpsignal-core.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use serpsignal_core::{
    render, BriefParams, BriefPipeline, BriefRun, Config, ProgressEvent, ProgressSink,
    DEFAULT_AUDIENCE, DEFAULT_GOAL,
};

#[derive(Parser)]
#[command(name = "serpsignal")]
#[command(about = "Analizza i top risultati SERP e genera un content brief")]
#[command(version)]
struct Cli {
    /// Target keyword to analyze
    keyword: String,

    /// Intended audience of the content
    #[arg(long, default_value = DEFAULT_AUDIENCE)]
    audience: String,

    /// Goal of the content
    #[arg(long, default_value = DEFAULT_GOAL)]
    goal: String,

    /// Number of SERP results to analyze
    #[arg(short = 'n', long, default_value_t = 8, value_parser = clap::value_parser!(u8).range(3..=10))]
    results: u8,

    /// Domain to exclude from the results (overrides TARGET_DOMAIN)
    #[arg(long)]
    exclude_domain: Option<String>,

    /// Directory where the HTML and TXT artifacts are written
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(domain) = cli.exclude_domain {
        config.target_domain = Some(domain);
    }

    let params = BriefParams {
        keyword: cli.keyword,
        audience: cli.audience,
        goal: cli.goal,
        num_results: cli.results as usize,
    };

    let pipeline = BriefPipeline::from_config(&config);
    let sink = ConsoleSink::default();
    let run = pipeline.run(&params, &sink).await?;

    let (html_path, txt_path) = write_artifacts(&run, &cli.out_dir)?;
    print_summary(&run, &html_path, &txt_path);
    Ok(())
}

fn write_artifacts(run: &BriefRun, out_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let base = render::artifact_basename(&run.request.keyword, run.generated_at);
    let html_path = out_dir.join(format!("{base}.html"));
    let txt_path = out_dir.join(format!("{base}.txt"));

    fs::write(&html_path, &run.document.html)
        .with_context(|| format!("Failed to write {}", html_path.display()))?;
    fs::write(&txt_path, &run.document.raw_text)
        .with_context(|| format!("Failed to write {}", txt_path.display()))?;

    Ok((html_path, txt_path))
}

fn print_summary(run: &BriefRun, html_path: &Path, txt_path: &Path) {
    let pages = &run.request.pages;
    let avg_words =
        pages.iter().map(|p| p.signal.word_count).sum::<usize>() / pages.len().max(1);
    let total_headings: usize = pages.iter().map(|p| p.signal.headings.len()).sum();

    println!();
    println!("{}", style("Brief completato").green().bold());
    println!("  Pagine analizzate:        {}", pages.len());
    println!("  Media parole competitor:  ~{avg_words}");
    println!("  Heading totali estratti:  {total_headings}");
    if run.degraded_pages > 0 {
        println!("  Pagine non raggiungibili: {}", run.degraded_pages);
    }
    println!("  HTML: {}", html_path.display());
    println!("  TXT:  {}", txt_path.display());
}

/// Renders pipeline progress on the terminal: one step line per phase and
/// a bar across the per-page analysis.
#[derive(Default)]
struct ConsoleSink {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressSink for ConsoleSink {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RankingStarted => {
                println!(
                    "{} Recupero risultati SERP...",
                    style("[1/3]").bold().dim()
                );
            }
            ProgressEvent::RankingComplete { count } => {
                println!("      {count} risultati trovati");
                println!(
                    "{} Analisi pagine competitor...",
                    style("[2/3]").bold().dim()
                );
                let bar = ProgressBar::new(*count as u64);
                bar.set_style(
                    ProgressStyle::with_template("      {bar:30.cyan/blue} {pos}/{len} {msg}")
                        .expect("valid progress template"),
                );
                *self.bar.lock().unwrap() = Some(bar);
            }
            ProgressEvent::PageFetchStarted { position, url } => {
                if let Some(bar) = self.bar.lock().unwrap().as_ref() {
                    bar.set_message(format!("[{position}] {url}"));
                }
            }
            ProgressEvent::PageAnalyzed {
                headings,
                word_count,
                degraded,
                ..
            } => {
                if let Some(bar) = self.bar.lock().unwrap().as_ref() {
                    if *degraded {
                        bar.set_message("pagina non raggiungibile".to_string());
                    } else {
                        bar.set_message(format!("{headings} heading | ~{word_count} parole"));
                    }
                    bar.inc(1);
                }
            }
            ProgressEvent::SynthesisStarted => {
                if let Some(bar) = self.bar.lock().unwrap().take() {
                    bar.finish_and_clear();
                }
                println!(
                    "{} Generazione brief con il modello...",
                    style("[3/3]").bold().dim()
                );
            }
            ProgressEvent::SynthesisComplete => {
                println!("      Brief generato");
            }
        }
    }
}
