use anyhow::Context;
use clap::{Parser, Subcommand};
use lightbox_compose::{SceneConfig, compose, ground_size};
use lightbox_render::{Camera, DebugTextRenderer, FrameDriver, ManualScheduler, Renderer};
use lightbox_scene::GeometryKind;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lightbox-cli", about = "Headless tool for lightbox scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the built-in scene defaults
    Info,
    /// Compose a scene and print its graph, controls and warnings
    Compose {
        /// Scene config file (.yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Maximum number of nodes to list
        #[arg(short, long, default_value = "40")]
        limit: usize,
    },
    /// Step the frame loop headlessly and report the animated object
    Run {
        /// Scene config file (.yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of frames to run
        #[arg(short, long, default_value = "120")]
        frames: u64,
    },
    /// Print the default scene config
    DefaultConfig {
        /// Emit JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::from_path(path)
            .with_context(|| format!("loading scene config {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn camera_for(config: &SceneConfig) -> Camera {
    let c = &config.camera;
    Camera::perspective(c.position, c.target, c.fov_degrees, c.near, c.far)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = SceneConfig::default();
            let grid = config.grid();
            println!("lightbox-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "light: {} intensity={} ambient={} ({})",
                config.light_type,
                config.light_intensity,
                config.enable_ambient_light,
                config.ambient_light_intensity
            );
            println!(
                "grid: {}x{} boxes, spacing={}, span={}",
                grid.count,
                grid.count,
                grid.spacing,
                grid.span()
            );
            println!("ground: {}x{}", ground_size(&config), ground_size(&config));
            println!(
                "camera: fov={} near={} far={}",
                config.camera.fov_degrees, config.camera.near, config.camera.far
            );
        }
        Commands::Compose { config, limit } => {
            let config = load_config(config.as_deref())?;
            let scene = compose(&config);
            let camera = camera_for(&config);

            print!(
                "{}",
                DebugTextRenderer::with_limit(limit).render(&scene.graph, &camera)
            );
            println!(
                "Meshes: boxes={} planes={} spheres={}",
                scene.graph.count_geometry(GeometryKind::Box),
                scene.graph.count_geometry(GeometryKind::Plane),
                scene.graph.count_geometry(GeometryKind::Sphere)
            );

            println!("Controls ({} light):", scene.light_kind);
            for b in &scene.bindings {
                let value = b.read(&scene.graph)?;
                println!(
                    "  {:<12} {:>8.3}  [{}, {}]",
                    b.label, value, b.min, b.max
                );
            }

            if scene.diagnostics.is_empty() {
                println!("Warnings: none");
            } else {
                println!("Warnings:");
                for problem in &scene.diagnostics {
                    println!("  {problem}");
                }
            }
        }
        Commands::Run { config, frames } => {
            let config = load_config(config.as_deref())?;
            let mut scene = compose(&config);
            let mut camera = camera_for(&config);
            let mut driver = FrameDriver::new(scene.animated);
            let mut scheduler = ManualScheduler::new();
            let renderer = DebugTextRenderer::with_limit(0);

            println!("Running {frames} frames");
            let mut ran = 0;
            while ran < frames && (ran == 0 || scheduler.take()) {
                driver.tick(&mut scheduler, &mut scene.graph, &mut camera, None, &renderer);
                ran += 1;
            }
            tracing::debug!(frames = ran, pending = scheduler.pending(), "headless run finished");

            let timer = driver.timer();
            println!(
                "Frames: {}  avg={:?} min={:?} max={:?}",
                driver.frames(),
                timer.average(),
                timer.min(),
                timer.max()
            );

            match driver.tracked() {
                Some(id) => {
                    let node = scene
                        .graph
                        .get(id)
                        .with_context(|| format!("tracked node {id} vanished"))?;
                    let t = node.transform;
                    println!(
                        "{}: rotation.x={:.3} scale=({:.3}, {:.3}, {:.3})",
                        node.name, t.rotation.x, t.scale.x, t.scale.y, t.scale.z
                    );
                    if let Some(state) = driver.animator().state(id) {
                        println!("Phase: {:?}", state.phase);
                    }
                }
                None => println!("No animated object"),
            }
        }
        Commands::DefaultConfig { json } => {
            let config = SceneConfig::default();
            let text = if json {
                config.to_json()?
            } else {
                config.to_yaml()?
            };
            println!("{text}");
        }
    }

    Ok(())
}
