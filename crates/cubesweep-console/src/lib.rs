//! Colorful console output for sweep progress.
//!
//! Provides a custom `tracing` layer that renders harness events as a live
//! progress feed. Every row written to the result table is mirrored here.
//!
//! ## Log Levels
//!
//! - **INFO**: Sweep start/end and one line per written row
//! - **WARN**: Skipped points and solvers exiting with a failure status
//! - **DEBUG**: Point starts and individual measured trials

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static SWEEP_START_NANOS: AtomicU64 = AtomicU64::new(0);

/// Package version for banner display.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "cubesweep_benchmark=info,cubesweep=info";

/// Initializes the console output with [`DEFAULT_FILTER`].
///
/// Safe to call multiple times - only the first call has effect.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Initializes the console output, using `directives` unless `RUST_LOG` is
/// set.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the banner and sets up tracing.
pub fn init_with_filter(directives: &str) {
    INIT.get_or_init(|| {
        print_banner();

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(SweepConsoleLayer)
            .try_init();
    });
}

// Marks the start of a sweep for elapsed time tracking.
fn mark_sweep_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    SWEEP_START_NANOS.store(nanos, Ordering::Relaxed);
}

// Returns elapsed time since sweep start.
fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = SWEEP_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = r#"
            _
  ___ _   _| |__   ___  _____      _____  ___ _ __
 / __| | | | '_ \ / _ \/ __\ \ /\ / / _ \/ _ \ '_ \
| (__| |_| | |_) |  __/\__ \\ V  V /  __/  __/ |_) |
 \___|\__,_|_.__/ \___||___/ \_/\_/ \___|\___| .__/
                                             |_|
"#;

    let version_line = format!(
        "                v{} - Solver Benchmark Sweeps\n",
        VERSION
    );

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats sweep events with colors.
pub struct SweepConsoleLayer;

impl<S: Subscriber> Layer<S> for SweepConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();

        // Accept events from harness modules
        if !target.starts_with("cubesweep") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let level = *metadata.level();
        let output = format_event(&visitor, level);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    message: Option<String>,
    shape: Option<String>,
    line: Option<String>,
    point: Option<String>,
    trial: Option<String>,
    error: Option<String>,
    status: Option<String>,
    points: Option<u64>,
    runs: Option<u64>,
    algorithms: Option<u64>,
    index: Option<u64>,
    run_index: Option<u64>,
    rows: Option<u64>,
    skipped: Option<u64>,
    duration_ms: Option<u64>,
    elapsed: Option<f64>,
}

impl EventVisitor {
    fn set_string(&mut self, field: &Field, value: String) {
        match field.name() {
            "event" => self.event = Some(value),
            "message" => self.message = Some(value),
            "shape" => self.shape = Some(value),
            "line" => self.line = Some(value),
            "point" => self.point = Some(value),
            "trial" => self.trial = Some(value),
            "error" => self.error = Some(value),
            "status" => self.status = Some(value),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.set_string(field, format!("{:?}", value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "points" => self.points = Some(value),
            "runs" => self.runs = Some(value),
            "algorithms" => self.algorithms = Some(value),
            "index" => self.index = Some(value),
            "run_index" => self.run_index = Some(value),
            "rows" => self.rows = Some(value),
            "skipped" => self.skipped = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value as u64);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if field.name() == "elapsed" {
            self.elapsed = Some(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set_string(field, value.to_string());
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "sweep_start" => format_sweep_start(v),
        "sweep_end" => format_sweep_end(v),
        "row" => format_row(v),
        "point_skipped" => format_point_skipped(v),
        "solver_exit_status" => format_exit_status(v),
        "point_start" => format_point_start(v),
        "trial_measured" => format_trial(v, level),
        "" => format_plain(v, level),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>8.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_sweep_start(v: &EventVisitor) -> String {
    mark_sweep_start();
    let shape = v.shape.as_deref().unwrap_or("unknown");
    let points = v.points.unwrap_or(0);
    let runs = v.runs.unwrap_or(0);
    let algorithms = v.algorithms.unwrap_or(0);

    format!(
        "{} {} Sweeping {} │ {} points │ {} algorithms │ {} runs/point │ {} trials",
        format_elapsed(),
        "▶".bright_green().bold(),
        shape.white().bold(),
        points.to_formatted_string(&Locale::en).bright_yellow(),
        algorithms.to_formatted_string(&Locale::en).bright_yellow(),
        runs.to_formatted_string(&Locale::en).bright_yellow(),
        (points * runs)
            .to_formatted_string(&Locale::en)
            .bright_magenta()
    )
}

fn format_sweep_end(v: &EventVisitor) -> String {
    let rows = v.rows.unwrap_or(0);
    let skipped = v.skipped.unwrap_or(0);
    let duration = v.duration_ms.unwrap_or(0);

    let mut output = format!(
        "{} {} Sweep complete │ {} rows │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        rows.to_formatted_string(&Locale::en).bright_yellow(),
        format_duration_ms(duration).yellow(),
    );

    if skipped > 0 {
        output.push_str(&format!(
            " │ {} skipped",
            skipped.to_formatted_string(&Locale::en).bright_red().bold()
        ));
    }

    output
}

fn format_row(v: &EventVisitor) -> String {
    let line = v.line.as_deref().unwrap_or("");
    let position = match (v.index, v.points) {
        (Some(index), Some(points)) => format_position(index + 1, points),
        _ => String::new(),
    };

    format!(
        "{} {} {} {}",
        format_elapsed(),
        "●".bright_green(),
        position.bright_black(),
        line.white().bold()
    )
}

fn format_point_skipped(v: &EventVisitor) -> String {
    let point = v.point.as_deref().unwrap_or("unknown point");
    let error = v.error.as_deref().unwrap_or("unknown error");

    format!(
        "{} {} Skipped {} │ {}",
        format_elapsed(),
        "✗".bright_red().bold(),
        point.white(),
        error.bright_red()
    )
}

fn format_exit_status(v: &EventVisitor) -> String {
    let status = v.status.as_deref().unwrap_or("unknown status");
    let trial = v.trial.as_deref().unwrap_or("");

    format!(
        "{} {} Solver {} but reported a time │ {}",
        format_elapsed(),
        "!".yellow().bold(),
        status.yellow(),
        trial.bright_black()
    )
}

fn format_point_start(v: &EventVisitor) -> String {
    let point = v.point.as_deref().unwrap_or("");
    format!(
        "{} {} {}",
        format_elapsed(),
        "▷".bright_blue(),
        point.bright_black()
    )
}

fn format_trial(v: &EventVisitor, level: Level) -> String {
    if level > Level::DEBUG {
        return String::new();
    }
    let run = v.run_index.unwrap_or(0) + 1;
    let elapsed = v.elapsed.unwrap_or(0.0);

    format!(
        "{}     run {:>3} │ {}",
        format_elapsed(),
        run.to_formatted_string(&Locale::en).bright_black(),
        format!("{:.6}", elapsed).bright_magenta()
    )
}

// Events without an `event` field, e.g. messages from the CLI.
fn format_plain(v: &EventVisitor, level: Level) -> String {
    let Some(message) = v.message.as_deref() else {
        return String::new();
    };
    let tag = match level {
        Level::ERROR => "error".bright_red().bold().to_string(),
        Level::WARN => "warn".yellow().bold().to_string(),
        Level::INFO => "info".bright_green().to_string(),
        _ => "debug".bright_black().to_string(),
    };
    format!("{} {} {}", format_elapsed(), tag, message)
}

fn format_position(current: u64, total: u64) -> String {
    let width = total.to_formatted_string(&Locale::en).len();
    format!(
        "[{:>width$}/{}]",
        current.to_formatted_string(&Locale::en),
        total.to_formatted_string(&Locale::en),
        width = width
    )
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}
