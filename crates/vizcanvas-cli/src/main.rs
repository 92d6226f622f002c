use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{info, warn};
use vizcanvas_core::{Duration, Size2D, Timestamp, Viewport, VizConfig, VizResult};
use vizcanvas_ir::{sample_scene, validate_scene, Normalized, Normalizer};
use vizcanvas_render::image_io::save_png;
use vizcanvas_render::{
    FrameHost, FrameScheduler, Painter, RasterSurface, RecordingSurface, RenderPipeline, TextRenderer,
};

#[derive(Parser)]
#[command(
    name = "vizcanvas",
    version,
    about = "vizcanvas — interpret visualization payloads and animate them",
    long_about = "vizcanvas turns loosely-shaped visualization payloads (JSON, or prose\nwith JSON embedded in it) into a looping animated scene.\n\nJSON goes to stdout, logs go to stderr."
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a payload and print the trace and a scene summary
    Inspect {
        /// Payload file, or '-' for stdin
        #[arg()]
        input: String,
    },

    /// Print the canonical scene as JSON
    Normalize {
        /// Payload file, or '-' for stdin
        #[arg()]
        input: String,
    },

    /// Print the draw operations of one frame as JSON
    Ops {
        /// Payload file, or '-' for stdin
        #[arg()]
        input: String,

        /// Playback time of the frame in milliseconds
        #[arg(long, default_value_t = 0.0)]
        at_ms: f64,

        /// Surface width in CSS pixels (default: canvas fallback width)
        #[arg(long)]
        width: Option<f64>,

        /// Surface height in CSS pixels (default: canvas fallback height)
        #[arg(long)]
        height: Option<f64>,
    },

    /// Rasterize one frame to a PNG file
    Render {
        /// Payload file, or '-' for stdin
        #[arg()]
        input: String,

        /// Output PNG path
        #[arg(short, long)]
        out: PathBuf,

        /// Playback time of the frame in milliseconds
        #[arg(long, default_value_t = 0.0)]
        at_ms: f64,

        #[arg(long)]
        width: Option<f64>,

        #[arg(long)]
        height: Option<f64>,

        /// Device pixel ratio
        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Use the dark theme palette
        #[arg(long)]
        dark: bool,

        /// TrueType/OpenType font used for all text
        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// Drive the frame scheduler with synthetic refresh timestamps and
    /// write every frame as a PNG
    ///
    /// Frame intervals longer than the configured max_frame_delta_ms are
    /// clamped, exactly as a stalled browser tab would be.
    Frames {
        /// Payload file, or '-' for stdin
        #[arg()]
        input: String,

        /// Output directory (created if missing)
        #[arg(long)]
        out_dir: PathBuf,

        #[arg(long, default_value_t = 30.0)]
        fps: f64,

        #[arg(long, default_value_t = 30)]
        count: usize,

        #[arg(long)]
        width: Option<f64>,

        #[arg(long)]
        height: Option<f64>,

        #[arg(long)]
        dark: bool,

        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// Print the built-in sample scene as JSON
    Sample,

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr with no ANSI colors so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { input } => cmd_inspect(&config, &input),
        Commands::Normalize { input } => cmd_normalize(&config, &input),
        Commands::Ops {
            input,
            at_ms,
            width,
            height,
        } => cmd_ops(&config, &input, at_ms, width, height),
        Commands::Render {
            input,
            out,
            at_ms,
            width,
            height,
            scale,
            dark,
            font,
        } => {
            let config = with_theme(config, dark);
            anyhow::ensure!(scale.is_finite() && scale > 0.0, "--scale must be positive, got {}", scale);
            let size = surface_size(&config, width, height, scale)?;
            cmd_render(&config, &input, &out, at_ms, size, scale, font.as_deref())
        }
        Commands::Frames {
            input,
            out_dir,
            fps,
            count,
            width,
            height,
            dark,
            font,
        } => {
            let config = with_theme(config, dark);
            let size = surface_size(&config, width, height, 1.0)?;
            cmd_frames(&config, &input, &out_dir, fps, count, size, font.as_deref())
        }
        Commands::Sample => print_json(&sample_scene()),
        Commands::Config => {
            let text = toml::to_string_pretty(&config).context("failed to serialize config")?;
            print!("{}", text);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<VizConfig> {
    match path {
        Some(path) => VizConfig::load_from_file(path)
            .with_context(|| format!("failed to load config: {}", path.display())),
        None => Ok(VizConfig::default()),
    }
}

fn with_theme(mut config: VizConfig, dark: bool) -> VizConfig {
    if dark {
        config.theme.dark = true;
    }
    config
}

/// Largest backing-store side, in device pixels, a headless frame may use.
const MAX_SURFACE_PX: f64 = 16_384.0;

fn surface_size(config: &VizConfig, width: Option<f64>, height: Option<f64>, scale: f64) -> Result<Size2D> {
    let fallback = config.canvas.fallback_size();
    let size = Size2D::new(width.unwrap_or(fallback.width), height.unwrap_or(fallback.height));
    for (name, side) in [("--width", size.width), ("--height", size.height)] {
        anyhow::ensure!(
            side.is_finite() && side * scale <= MAX_SURFACE_PX,
            "{} {} at scale {} exceeds the {}px surface limit",
            name,
            side,
            scale,
            MAX_SURFACE_PX
        );
    }
    Ok(size)
}

/// Read a payload from a file or stdin. Text that is not JSON is passed on
/// as a string so the content extractor can look inside it.
fn read_payload(input: &str) -> Result<Value> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("failed to read file: {}", input))?
    };
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

fn load(config: &VizConfig, input: &str) -> Result<Normalized> {
    let payload = read_payload(input)?;
    let normalized = Normalizer::from_config(&config.playback).normalize(&payload);
    info!(trace = %normalized.trace, "payload normalized");
    Ok(normalized)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

fn cmd_inspect(config: &VizConfig, input: &str) -> Result<()> {
    let normalized = load(config, input)?;
    println!("🔍 vizcanvas payload inspector");
    println!("   trace: {}", normalized.trace);

    let Some(scene) = normalized.scene else {
        println!("   ✗ no scene; the demo animation would play");
        return Ok(());
    };

    println!(
        "🎞️  Scene [{}ms, {} layers, {} animations]",
        scene.duration_ms,
        scene.layers.len(),
        scene.animation_count()
    );
    for (i, layer) in scene.layers.iter().enumerate() {
        let prefix = if i + 1 == scene.layers.len() { "└──" } else { "├──" };
        let props: Vec<String> = layer
            .props
            .iter()
            .map(|(key, value)| format!("{}={}", key, value.to_display_string()))
            .collect();
        println!("{} #{} {} {{{}}}", prefix, i, layer.kind, props.join(", "));
        for anim in &layer.animations {
            println!(
                "      ↳ {}: {} → {} over {}..{}ms",
                anim.property, anim.from, anim.to, anim.start, anim.end
            );
        }
    }

    let warnings = validate_scene(&scene);
    if warnings.is_empty() {
        println!("   ✓ no warnings");
    }
    for warning in warnings {
        println!("   ⚠️ {}", warning);
    }
    Ok(())
}

fn cmd_normalize(config: &VizConfig, input: &str) -> Result<()> {
    let normalized = load(config, input)?;
    let scene = normalized
        .scene
        .with_context(|| format!("payload did not yield a scene ({})", normalized.trace))?;
    print_json(&scene)
}

fn cmd_ops(config: &VizConfig, input: &str, at_ms: f64, width: Option<f64>, height: Option<f64>) -> Result<()> {
    let normalized = load(config, input)?;
    let size = surface_size(config, width, height, 1.0)?;
    let mut surface = RecordingSurface::new(size.width, size.height);
    let trace = normalized.trace.to_string();
    Painter::new(config).paint(
        &mut surface,
        normalized.scene.as_ref(),
        Duration::from_millis(at_ms),
        Some(&trace),
    );
    print_json(&surface.into_ops())
}

fn cmd_render(
    config: &VizConfig,
    input: &str,
    out: &Path,
    at_ms: f64,
    size: Size2D,
    scale: f64,
    font: Option<&Path>,
) -> Result<()> {
    let normalized = load(config, input)?;
    let mut pipeline = RenderPipeline::new(config, size.width, size.height, scale);
    if let Some(font) = font {
        pipeline
            .load_font(font)
            .with_context(|| format!("failed to load font: {}", font.display()))?;
    }
    let trace = normalized.trace.to_string();
    let frame = pipeline.render_frame(
        normalized.scene.as_ref(),
        Duration::from_millis(at_ms),
        Some(&trace),
    );
    ensure_parent(out)?;
    save_png(&frame, out).with_context(|| format!("failed to write {}", out.display()))?;
    info!(
        path = %out.display(),
        width = frame.width,
        height = frame.height,
        "frame written"
    );
    Ok(())
}

/// Hands out increasing handles; the caller fires refreshes itself.
#[derive(Default)]
struct SyntheticHost {
    next: i32,
}

impl FrameHost for SyntheticHost {
    fn request_frame(&mut self) -> VizResult<i32> {
        self.next += 1;
        Ok(self.next)
    }

    fn cancel_frame(&mut self, _handle: i32) {}
}

fn cmd_frames(
    config: &VizConfig,
    input: &str,
    out_dir: &Path,
    fps: f64,
    count: usize,
    size: Size2D,
    font: Option<&Path>,
) -> Result<()> {
    anyhow::ensure!(fps.is_finite() && fps > 0.0, "--fps must be positive, got {}", fps);
    let payload = read_payload(input)?;

    let mut text = TextRenderer::new();
    if let Some(font) = font {
        let name = font
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        text.load_font(&name, font)
            .with_context(|| format!("failed to load font: {}", font.display()))?;
    }
    let viewport = Viewport::fit(size, 1.0, config.canvas.min_size());
    let mut surface = RasterSurface::new(viewport, config.theme.theme().palette().background, Arc::new(text));

    let mut host = SyntheticHost::default();
    let mut scheduler = FrameScheduler::new(config);
    scheduler.attach(&mut host).context("failed to attach scheduler")?;
    if !scheduler.load_payload(&payload) {
        warn!("payload did not yield a scene; rendering the demo animation");
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir: {}", out_dir.display()))?;
    let interval = 1000.0 / fps;
    for index in 0..count {
        let now = Timestamp::from_millis(index as f64 * interval);
        let stats = scheduler
            .on_frame(&mut surface, &mut host, now)
            .context("failed to schedule frame")?;
        let path = out_dir.join(format!("frame_{:05}.png", index));
        save_png(surface.frame(), &path).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(index, elapsed = %stats.elapsed, "frame written");
    }
    scheduler.detach(&mut host);

    info!(
        count,
        dir = %out_dir.display(),
        status = %scheduler.status_line(),
        "frames written"
    );
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}
