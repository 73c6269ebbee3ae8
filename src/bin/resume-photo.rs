//! CLI binary for resume-photo.
//!
//! A thin shim over the library crate: maps CLI flags to `TransformConfig`,
//! walks one `Session` through upload → generate → download and prints the
//! outcome.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use resume_photo::{
    GenerateOutcome, ProgressCallback, Session, StylePreference, TransformConfig,
    TransformProgressCallback, Upload,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner shown while the single model call is in flight.
struct CliSpinner {
    bar: ProgressBar,
    started: std::sync::Mutex<Option<Instant>>,
}

impl CliSpinner {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Generating");

        Arc::new(Self {
            bar,
            started: std::sync::Mutex::new(None),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|g| *g)
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl TransformProgressCallback for CliSpinner {
    fn on_transform_start(&self, message: &str) {
        if let Ok(mut started) = self.started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(message.to_string());
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_transform_complete(&self, media_type: &str, encoded_len: usize) {
        let secs = self.elapsed_secs();
        self.bar.finish_and_clear();
        eprintln!(
            "{} {}  {}  {}",
            green("✔"),
            bold("Photo generated"),
            dim(&format!("{media_type}, {} KiB", encoded_len * 3 / 4 / 1024)),
            dim(&format!("{secs:.1}s")),
        );
    }

    fn on_transform_error(&self, error: &str) {
        let secs = self.elapsed_secs();
        self.bar.finish_and_clear();
        eprintln!("{} {}  {}", red("✘"), red(error), dim(&format!("{secs:.1}s")));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Generate into the current directory
  resume-photo selfie.jpg

  # Steer towards women's business attire, save elsewhere
  resume-photo --style female selfie.jpg -o ~/Pictures

  # Use a different model or endpoint
  resume-photo --model gemini-2.5-flash-image --api-base http://localhost:8080/v1beta me.png

  # Machine-readable summary
  resume-photo --json me.png

OUTPUT:
  The result is always saved as professional-resume-photo.png inside the
  output directory (overwriting any previous result there).

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Generative Language API key
  GOOGLE_API_KEY          Fallback key variable
  API_KEY                 Fallback key variable
  RUST_LOG                Log filter (overrides -v / -q)

  The key is not checked before the request is sent; a missing or invalid
  key is reported by the API and shown as the error message.
"#;

/// Turn a personal photo into a professional resume headshot.
#[derive(Parser, Debug)]
#[command(
    name = "resume-photo",
    version,
    about = "Turn a personal photo into a professional resume headshot",
    long_about = "Send a photo to a generative image model and receive a studio-style resume \
headshot: business attire, neutral studio backdrop, soft lighting, standard head-and-shoulders \
crop, with the person's face and hairstyle preserved.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image file to transform (JPG, PNG, WEBP, …).
    input: PathBuf,

    /// Directory to save professional-resume-photo.png into.
    #[arg(short, long, env = "RESUME_PHOTO_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Attire style: male, female, unspecified (also m, f, neutral).
    #[arg(short, long, env = "RESUME_PHOTO_STYLE", default_value = "unspecified")]
    style: StylePreference,

    /// Image model ID.
    #[arg(long, env = "RESUME_PHOTO_MODEL", default_value = resume_photo::config::DEFAULT_MODEL)]
    model: String,

    /// API base URL.
    #[arg(long, env = "RESUME_PHOTO_API_BASE", default_value = resume_photo::config::DEFAULT_API_BASE)]
    api_base: String,

    /// API key (otherwise read from GEMINI_API_KEY / GOOGLE_API_KEY / API_KEY).
    #[arg(long, env = "RESUME_PHOTO_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Path to a text file replacing the built-in instruction.
    #[arg(long, env = "RESUME_PHOTO_INSTRUCTION")]
    instruction: Option<PathBuf>,

    /// Per-call timeout in seconds (default: none).
    #[arg(long, env = "RESUME_PHOTO_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Print a JSON summary on stdout.
    #[arg(long, env = "RESUME_PHOTO_JSON")]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "RESUME_PHOTO_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RESUME_PHOTO_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "RESUME_PHOTO_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters, so INFO logs are
    // muted while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliSpinner::new() as Arc<dyn TransformProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb).await?;

    // ── Upload ───────────────────────────────────────────────────────────
    let mut session = Session::new(config);
    let upload = Upload::from_path(&cli.input)
        .with_context(|| format!("Cannot use '{}' as a photo", cli.input.display()))?;
    session.accept_upload(upload).context("Upload rejected")?;

    // ── Generate ─────────────────────────────────────────────────────────
    let started = Instant::now();
    let outcome = session.generate().await;
    let duration_ms = started.elapsed().as_millis() as u64;

    // ── Download ─────────────────────────────────────────────────────────
    let saved = match outcome {
        GenerateOutcome::Succeeded => {
            let download = session
                .download()
                .context("Result image is not valid base64")?
                .context("No result image to save")?;
            Some(
                download
                    .save_to_dir(&cli.output_dir)
                    .context("Failed to save result")?,
            )
        }
        GenerateOutcome::Failed(_) | GenerateOutcome::Skipped => None,
    };

    if cli.json {
        let summary = serde_json::json!({
            "input": cli.input,
            "style": session.style(),
            "status": session.status(),
            "phase": session.phase(),
            "output": saved,
            "media_type": session.result().map(|r| r.media_type.as_str()),
            "duration_ms": duration_ms,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        match (&saved, session.status().error.as_deref()) {
            (Some(path), _) => eprintln!("→  {}", bold(&path.display().to_string())),
            // The spinner already printed the error line.
            (None, Some(err)) if !show_progress => eprintln!("{} {}", red("✘"), red(err)),
            _ => {}
        }
    }

    if let Some(err) = session.status().error.clone() {
        anyhow::bail!("Generation failed: {err}\nRun the command again to retry.");
    }
    Ok(())
}

/// Map CLI args to `TransformConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<TransformConfig> {
    let mut builder = TransformConfig::builder()
        .model(&cli.model)
        .api_base(&cli.api_base)
        .style(cli.style);

    if let Some(ref path) = cli.instruction {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read instruction from {:?}", path))?;
        builder = builder.instruction(text);
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
