use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use lumen_common::{EngineConfig, Transform};
use lumen_render::trace::{Trace, TraceObject, TraceShader};
use lumen_render::{Camera, Renderer};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lumen-cli", about = "CLI tool for the lumen renderer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Flush one synthetic frame and dump every recorded call
    Trace {
        /// Number of opaque objects
        #[arg(long, default_value = "2")]
        opaque: usize,
        /// Number of transparent objects
        #[arg(long, default_value = "1")]
        transparent: usize,
        /// Outline every k-th object (0 disables outlines)
        #[arg(long, default_value = "2")]
        outline_every: usize,
        /// Engine configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Feed repeated mouse offsets into a camera and print its orientation
    Camera {
        #[arg(long, default_value = "10.0", allow_hyphen_values = true)]
        dx: f32,
        #[arg(long, default_value = "10.0", allow_hyphen_values = true)]
        dy: f32,
        /// Number of mouse events to apply
        #[arg(long, default_value = "10")]
        steps: u32,
        /// Let pitch leave the [-89, 89] range
        #[arg(long)]
        unconstrained: bool,
    },
    /// Validate a configuration file and print the effective values
    Config { path: PathBuf },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Lay out `opaque + transparent` objects in a row, outlining every
/// `outline_every`-th one.
fn build_objects(opaque: usize, transparent: usize, outline_every: usize) -> Vec<TraceObject> {
    (0..opaque + transparent)
        .map(|i| {
            let kind = if i < opaque { "opaque" } else { "glass" };
            let transform = Transform::from_position(Vec3::new(i as f32 * 2.0, 0.0, -5.0));
            let object = TraceObject::new(format!("{kind}-{i}"), transform);
            if outline_every > 0 && i % outline_every == 0 {
                object.outlined()
            } else {
                object
            }
        })
        .collect()
}

fn run_trace(
    config: &EngineConfig,
    opaque: usize,
    transparent: usize,
    outline_every: usize,
) -> (Trace, lumen_render::FrameStats) {
    let objects = build_objects(opaque, transparent, outline_every);
    let trace = Trace::new();
    let mut gfx = trace.backend();
    let mut main = trace.shader("main");
    let mut outline = trace.shader("outline");

    let mut renderer = Renderer::new(&config.outline);
    let mut frame = renderer.begin_frame::<TraceShader>();
    for (i, object) in objects.iter().enumerate() {
        if i < opaque {
            frame.submit_opaque(object);
        } else {
            frame.submit_transparent(object);
        }
    }
    let stats = frame.flush(&mut gfx, &mut main, &mut outline);
    (trace, stats)
}

fn simulate_camera(dx: f32, dy: f32, steps: u32, constrain: bool) -> Camera {
    let mut camera = Camera::default();
    for _ in 0..steps {
        camera.process_mouse_movement(dx, dy, constrain);
    }
    camera
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("lumen-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", lumen_common::crate_info());
            println!("render: {}", lumen_render::crate_info());
        }
        Commands::Trace {
            opaque,
            transparent,
            outline_every,
            config,
        } => {
            let config = load_config(config.as_ref())?;
            let (trace, stats) = run_trace(&config, opaque, transparent, outline_every);
            print!("{}", trace.render_text());
            println!(
                "frame {}: {} opaque, {} transparent, {} outlines, {} draw calls, {} events",
                stats.frame,
                stats.opaque,
                stats.transparent,
                stats.outlines,
                stats.draw_calls(),
                trace.len()
            );
        }
        Commands::Camera {
            dx,
            dy,
            steps,
            unconstrained,
        } => {
            let camera = simulate_camera(dx, dy, steps, !unconstrained);
            let f = camera.front();
            let u = camera.up();
            let r = camera.right();
            println!("yaw:   {:.3}", camera.yaw());
            println!("pitch: {:.3}", camera.pitch());
            println!("front: ({:.4}, {:.4}, {:.4})", f.x, f.y, f.z);
            println!("up:    ({:.4}, {:.4}, {:.4})", u.x, u.y, u.z);
            println!("right: ({:.4}, {:.4}, {:.4})", r.x, r.y, r.z);
        }
        Commands::Config { path } => {
            let config = load_config(Some(&path))?;
            println!("{} is valid", path.display());
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}
