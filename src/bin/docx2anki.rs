//! CLI binary for docx2anki.
//!
//! A thin shim over the library crate that reads JSON document dumps, maps
//! CLI flags to `ConversionConfig` and prints the resulting notes.

use anyhow::{Context, Result};
use clap::Parser;
use docx2anki::{
    convert, outline, read_document, write_media, ConversionConfig, ConversionProgressCallback,
    ConversionStats, ConversionWarning, FlashcardRecord, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar across all input files, with each
/// warning printed above it as it is reported.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new(total_files: usize) -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(total_files as u64);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, paragraph_count: usize) {
        self.bar.set_message(format!("{paragraph_count} paragraphs"));
    }

    fn on_warning(&self, warning: &ConversionWarning) {
        self.bar.println(format!("  {} {}", yellow("⚠"), warning));
    }

    fn on_conversion_complete(&self, note_count: usize, warning_count: usize) {
        self.bar.println(format!(
            "  {} {:>5} notes  {}",
            green("✓"),
            note_count,
            dim(&format!("{warning_count} warnings")),
        ));
        self.bar.inc(1);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Print notes as tab-separated lines (front, back, media, breadcrumb, tags)
  docx2anki notes.json

  # Export media next to the notes
  docx2anki notes.json --media-dir collection.media

  # Structured JSON for several documents
  docx2anki --json biology.json chemistry.json > cards.json

  # Show the heading tree instead of converting
  docx2anki --outline notes.json

INPUT FORMAT:
  A JSON dump of the document: {"paragraphs": [...], "tables": [...], "images": [...]}
  with image bytes base64-encoded. Media from several inputs share one
  directory; a later file replaces an earlier one with the same name.

MARKERS:
  ©©N   this paragraph and the next N lines form one note
  ®®N   the next paragraph is a picture shown N levels down (0 = own card)
  §§    reference to the 1×1 table whose first line matches this text
"#;

/// Convert styled document dumps into flashcard notes.
#[derive(Parser, Debug)]
#[command(
    name = "docx2anki",
    version,
    about = "Convert styled document dumps into flashcard notes",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// JSON document dumps to convert.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write referenced media files into this directory.
    #[arg(long, env = "DOCX2ANKI_MEDIA_DIR")]
    media_dir: Option<PathBuf>,

    /// Print the note tree of each input instead of converting.
    #[arg(long)]
    outline: bool,

    /// Output structured JSON instead of tab-separated lines.
    #[arg(long, env = "DOCX2ANKI_JSON")]
    json: bool,

    /// Group marker sentinel.
    #[arg(long, default_value = docx2anki::config::DEFAULT_GROUP_MARKER)]
    group_marker: String,

    /// Photo marker sentinel.
    #[arg(long, default_value = docx2anki::config::DEFAULT_PHOTO_MARKER)]
    photo_marker: String,

    /// Code-block marker sentinel.
    #[arg(long, default_value = docx2anki::config::DEFAULT_CODE_MARKER)]
    code_marker: String,

    /// Keep bold and italic text visible on the card front.
    #[arg(long)]
    no_redact: bool,

    /// Keep marker tokens in the rendered text.
    #[arg(long)]
    keep_markers: bool,

    /// Separator between the paragraphs of a grouped note.
    #[arg(long, default_value = "<br>")]
    separator: String,

    /// Disable progress bar.
    #[arg(long, env = "DOCX2ANKI_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCX2ANKI_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCX2ANKI_QUIET")]
    quiet: bool,
}

/// One input's result in `--json` mode. Media bytes are left out; use
/// `--media-dir` to get the files.
#[derive(Serialize)]
struct Report<'a> {
    input: &'a Path,
    notes: &'a [FlashcardRecord],
    media: Vec<&'a str>,
    warnings: &'a [ConversionWarning],
    stats: &'a ConversionStats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Warnings reach the user through the progress bar when it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.outline;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Outline mode ─────────────────────────────────────────────────────
    if cli.outline {
        let config = build_config(&cli, None)?;
        for input in &cli.inputs {
            let document = read_document(input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let tree = outline(&document, &config)
                .with_context(|| format!("Failed to build tree for {}", input.display()))?;
            if cli.inputs.len() > 1 {
                println!("{}", bold(&input.display().to_string()));
            }
            print!("{tree}");
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(|| CliProgressCallback::new(cli.inputs.len()));
    let config = build_config(
        &cli,
        progress
            .clone()
            .map(|cb| cb as Arc<dyn ConversionProgressCallback>),
    )?;

    // ── Run conversion ───────────────────────────────────────────────────
    let mut outputs = Vec::with_capacity(cli.inputs.len());
    for input in &cli.inputs {
        if let Some(ref cb) = progress {
            cb.bar.println(format!("{} {}", bold("◆"), input.display()));
        }
        let document = read_document(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let output = convert(&document, &config)
            .with_context(|| format!("Conversion of {} failed", input.display()))?;

        if let Some(ref dir) = cli.media_dir {
            write_media(dir, &output.media)
                .with_context(|| format!("Failed to write media for {}", input.display()))?;
        }
        outputs.push((input, output));
    }

    if let Some(ref cb) = progress {
        cb.bar.finish_and_clear();
    }

    // ── Print results ────────────────────────────────────────────────────
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if cli.json {
        let reports: Vec<Report<'_>> = outputs
            .iter()
            .map(|(input, out)| Report {
                input: input.as_path(),
                notes: &out.notes,
                media: out.media.iter().map(|m| m.name.as_str()).collect(),
                warnings: &out.warnings,
                stats: &out.stats,
            })
            .collect();
        let json = serde_json::to_string_pretty(&reports).context("Failed to serialise output")?;
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    } else {
        for (_, out) in &outputs {
            for note in &out.notes {
                writeln!(
                    handle,
                    "{}\t{}\t{}\t{}\t{}",
                    tsv_field(&note.front),
                    tsv_field(&note.back),
                    tsv_field(&note.media),
                    tsv_field(&note.breadcrumb),
                    note.tags.join(" "),
                )
                .context("Failed to write to stdout")?;
            }
        }
    }

    // ── Summary ──────────────────────────────────────────────────────────
    if !cli.quiet && !cli.json {
        let notes: usize = outputs.iter().map(|(_, o)| o.stats.notes).sum();
        let media: usize = outputs.iter().map(|(_, o)| o.stats.media_files).sum();
        let warnings: usize = outputs.iter().map(|(_, o)| o.stats.warnings).sum();
        let ms: u64 = outputs.iter().map(|(_, o)| o.stats.total_duration_ms).sum();
        eprintln!(
            "{}  {} notes  {} media  {}  {}ms",
            if warnings == 0 { green("✔") } else { yellow("⚠") },
            bold(&notes.to_string()),
            media,
            dim(&format!("{warnings} warnings")),
            ms,
        );
        if let Some(ref dir) = cli.media_dir {
            eprintln!("   media  →  {}", bold(&dir.display().to_string()));
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .group_marker(&cli.group_marker)
        .photo_marker(&cli.photo_marker)
        .code_marker(&cli.code_marker)
        .redact_emphasis(!cli.no_redact)
        .strip_markers(!cli.keep_markers)
        .paragraph_separator(&cli.separator);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Tabs and newlines would break the line-per-note format.
fn tsv_field(s: &str) -> String {
    s.replace('\t', "&#9;").replace('\n', "<br>")
}
