use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use showcase_driver::{Clock, FrameFlag, ManualClock, ResizeEvent, Surface};
use showcase_materials::{Material, MaterialKind};
use showcase_render::{Camera, DebugTextRenderer};
use showcase_setup::{ShowcaseConfig, Stage};
use showcase_tools::{ObjectInfo, ParameterPanel, SceneInspector, SceneSummary};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "showcase-cli", about = "Headless tools for the material showcase")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run the frame loop headless on a manual clock
    Simulate {
        /// Simulated duration in seconds
        #[arg(short, long, default_value = "10")]
        seconds: f64,
        /// Frames per simulated second
        #[arg(short, long, default_value = "60")]
        fps: u32,
        /// Viewport change as WIDTHxHEIGHT[@SCALE], applied halfway through (repeatable)
        #[arg(short, long, value_parser = parse_resize)]
        resize: Vec<ResizeEvent>,
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory texture paths are resolved against
        #[arg(long)]
        asset_root: Option<PathBuf>,
        /// Print the debug dump of the last frame
        #[arg(long)]
        dump: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List material presets and their panel controls
    Presets,
    /// Validate a YAML configuration file
    CheckConfig {
        path: PathBuf,
        /// Print the configuration with every default filled in
        #[arg(long)]
        print: bool,
    },
}

/// Parse `800x600` or `800x600@1.5`.
fn parse_resize(text: &str) -> Result<ResizeEvent, String> {
    let (size, scale) = match text.split_once('@') {
        Some((size, scale)) => (
            size,
            scale
                .parse::<f32>()
                .map_err(|e| format!("bad scale `{scale}`: {e}"))?,
        ),
        None => (text, 1.0),
    };
    let (width, height) = size
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{size}`"))?;
    let width = width
        .parse::<u32>()
        .map_err(|e| format!("bad width `{width}`: {e}"))?;
    let height = height
        .parse::<u32>()
        .map_err(|e| format!("bad height `{height}`: {e}"))?;
    Ok(ResizeEvent::new(width, height, scale))
}

/// Surface with nothing behind it; records what the driver asked for.
#[derive(Debug)]
struct HeadlessSurface {
    size: (u32, u32),
    scale: f32,
}

impl Surface for HeadlessSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }
}

/// Outcome of a headless run.
#[derive(Debug, Serialize)]
struct SimulationReport {
    frames: u64,
    elapsed: f64,
    /// XYZ Euler angles in radians.
    orientation: [f64; 2],
    aspect: f32,
    surface: (u32, u32, f32),
    summary: SceneSummary,
    objects: Vec<ObjectInfo>,
    state_hash: u64,
    replay_matches: bool,
    #[serde(skip)]
    last_frame: String,
}

impl SimulationReport {
    fn print(&self) {
        println!(
            "Frames: {}  Elapsed: {:.3}s  Orientation: x={:.4} y={:.4}",
            self.frames, self.elapsed, self.orientation[0], self.orientation[1]
        );
        println!(
            "Aspect: {:.4}  Surface: {}x{}@{}",
            self.aspect, self.surface.0, self.surface.1, self.surface.2
        );
        println!("{}", self.summary);
        for info in &self.objects {
            println!("  {info}");
        }
        println!(
            "State hash: {:#018x}  Replay: {}",
            self.state_hash,
            if self.replay_matches { "OK" } else { "MISMATCH" }
        );
    }
}

fn object_infos<K: Clock>(stage: &Stage<K>) -> Vec<ObjectInfo> {
    SceneInspector::list_objects(&stage.scene)
        .into_iter()
        .filter_map(|id| SceneInspector::inspect_object(&stage.scene, id))
        .collect()
}

/// Name, position and rotation of every object as exact bit patterns,
/// sorted so that scenes with different object ids compare equal.
fn poses(objects: &[ObjectInfo]) -> Vec<(String, [u32; 3], [u32; 3])> {
    let mut poses: Vec<_> = objects
        .iter()
        .map(|o| {
            (
                o.name.clone(),
                o.position.map(f32::to_bits),
                o.rotation.map(f32::to_bits),
            )
        })
        .collect();
    poses.sort();
    poses
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ShowcaseConfig> {
    Ok(match path {
        Some(path) => ShowcaseConfig::load(path)?,
        None => ShowcaseConfig::default(),
    })
}

fn simulate(
    seconds: f64,
    fps: u32,
    resizes: &[ResizeEvent],
    config: &ShowcaseConfig,
    asset_root: Option<&PathBuf>,
) -> anyhow::Result<SimulationReport> {
    anyhow::ensure!(fps > 0, "fps must be positive");
    anyhow::ensure!(
        seconds.is_finite() && seconds >= 0.0,
        "seconds must be a non-negative number"
    );

    let mut stage = Stage::build(config, ManualClock::new(), 1280, 720, 1.0)?;
    if let Some(root) = asset_root {
        let ready = stage.load_textures(root);
        tracing::info!(ready, root = %root.display(), "textures loaded");
    }

    let viewport = stage.driver.viewport();
    let mut surface = HeadlessSurface {
        size: (viewport.width(), viewport.height()),
        scale: viewport.scale(),
    };
    let mut flag = FrameFlag::new();
    let mut renderer = DebugTextRenderer::new();
    let total = (seconds * fps as f64).round() as u64;
    let halfway = total / 2;

    tracing::info!(seconds, fps, frames = total + 1, "simulating");
    stage.driver.start(&mut flag);

    let mut last = None;
    for i in 0..=total {
        if i == halfway {
            for event in resizes {
                let applied = stage.driver.on_resize(*event, &mut stage.camera, &mut surface);
                tracing::info!(
                    width = event.width,
                    height = event.height,
                    scale = event.scale,
                    frame = i,
                    applied,
                    "resize"
                );
            }
        }
        // The host only produces a frame when one was requested.
        if !flag.take() {
            break;
        }
        stage.driver.clock_mut().set(i as f64 / fps as f64);
        last = stage.driver.frame(
            &mut stage.scene,
            &mut stage.camera,
            Some(&mut stage.controls),
            &mut renderer,
            &mut flag,
        );
    }

    let report = last.context("driver produced no frame")?;
    let state_hash = stage.scene.state_hash();
    let summary = SceneInspector::summary(&stage.scene, &stage.driver);
    let objects = object_infos(&stage);

    // Orientation depends only on elapsed time: a fresh stage oriented once
    // at the final time must match the one that ran every frame.
    let elapsed = stage.driver.elapsed_seconds();
    let mut replay = Stage::build(config, ManualClock::new(), 1280, 720, 1.0)?;
    replay.driver.orient(&mut replay.scene, elapsed);
    let replay_matches = poses(&objects) == poses(&object_infos(&replay));
    if !replay_matches {
        tracing::warn!("replayed orientation differs from the simulated run");
    }

    Ok(SimulationReport {
        frames: stage.driver.frames(),
        elapsed: report.elapsed,
        orientation: [report.orientation.x, report.orientation.y],
        aspect: stage.camera.aspect(),
        surface: (surface.size.0, surface.size.1, surface.scale),
        summary,
        objects,
        state_hash,
        replay_matches,
        last_frame: report.output,
    })
}

fn print_presets() {
    for name in MaterialKind::NAMES {
        let Some(material) = Material::preset(name) else {
            continue;
        };
        let panel = ParameterPanel::for_material(&material);
        let controls: Vec<String> = panel
            .values(&material)
            .iter()
            .map(|(s, v)| format!("{}={v} [{}..{}]", s.binding.label(), s.min, s.max))
            .collect();
        println!(
            "{name:<10} lit={:<5} {}",
            material.kind.is_lit(),
            if controls.is_empty() {
                "(no controls)".to_string()
            } else {
                controls.join(", ")
            }
        );
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("showcase-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", showcase_common::crate_info());
            println!("materials: {}", showcase_materials::crate_info());
            println!("render: {}", showcase_render::crate_info());
            println!("input: {}", showcase_input::crate_info());
            println!("driver: {}", showcase_driver::crate_info());
            println!("tools: {}", showcase_tools::crate_info());
            println!("setup: {}", showcase_setup::crate_info());
        }
        Commands::Simulate {
            seconds,
            fps,
            resize,
            config,
            asset_root,
            dump,
            json,
        } => {
            let config = load_config(config.as_ref())?;
            let report = simulate(seconds, fps, &resize, &config, asset_root.as_ref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report.print();
            }
            if dump {
                println!("{}", report.last_frame);
            }
        }
        Commands::Presets => print_presets(),
        Commands::CheckConfig { path, print } => {
            let config = ShowcaseConfig::load(&path)
                .with_context(|| format!("invalid configuration {}", path.display()))?;
            println!(
                "OK: preset={} objects={} max_pixel_ratio={}",
                config.material.preset,
                config.objects.len(),
                config.driver.max_pixel_ratio
            );
            if print {
                print!("{}", config.to_yaml()?);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_resize_with_scale() {
        assert_eq!(
            parse_resize("800x600@1.5").unwrap(),
            ResizeEvent::new(800, 600, 1.5)
        );
    }

    #[test]
    fn parse_resize_defaults_scale() {
        assert_eq!(
            parse_resize("1024X0").unwrap(),
            ResizeEvent::new(1024, 0, 1.0)
        );
    }

    #[test]
    fn parse_resize_rejects_garbage() {
        assert!(parse_resize("800").is_err());
        assert!(parse_resize("axb").is_err());
        assert!(parse_resize("800x600@fast").is_err());
    }

    #[test]
    fn simulate_default_scene() {
        let resizes = [ResizeEvent::new(800, 600, 3.0)];
        let report = simulate(10.0, 30, &resizes, &ShowcaseConfig::default(), None).unwrap();
        assert_eq!(report.frames, 301);
        assert!((report.elapsed - 10.0).abs() < 1e-9);
        assert!((report.orientation[1] - 1.0).abs() < 1e-9);
        assert!((report.orientation[0] + 1.5).abs() < 1e-9);
        assert!((report.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(report.surface, (800, 600, 2.0));
        assert_eq!(report.objects.len(), 3);
        assert!(report.replay_matches);
        assert!(report.last_frame.contains("map=pending"));
    }

    #[test]
    fn degenerate_resize_is_ignored() {
        let resizes = [ResizeEvent::new(800, 0, 1.0)];
        let report = simulate(1.0, 10, &resizes, &ShowcaseConfig::default(), None).unwrap();
        assert_eq!(report.surface, (1280, 720, 1.0));
        assert!((report.aspect - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn report_serializes_to_json() {
        let report = simulate(0.5, 10, &[], &ShowcaseConfig::default(), None).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["frames"], 6);
        assert_eq!(json["summary"]["objects"], 3);
        assert!(json.get("last_frame").is_none());
    }

    #[test]
    fn poses_ignore_ids_but_not_rotation() {
        let a = simulate(2.0, 10, &[], &ShowcaseConfig::default(), None).unwrap();
        let b = simulate(2.0, 10, &[], &ShowcaseConfig::default(), None).unwrap();
        assert_ne!(a.objects[0].id, b.objects[0].id);
        assert_eq!(poses(&a.objects), poses(&b.objects));

        let mut drifted = b.objects.clone();
        drifted[1].rotation[1] += 1e-6;
        assert_ne!(poses(&a.objects), poses(&drifted));
    }

    #[test]
    fn replay_differs_from_unspun_stage() {
        let report = simulate(3.0, 10, &[], &ShowcaseConfig::default(), None).unwrap();
        let idle = Stage::build(&ShowcaseConfig::default(), ManualClock::new(), 1280, 720, 1.0).unwrap();
        assert!(report.replay_matches);
        assert_ne!(poses(&report.objects), poses(&object_infos(&idle)));
    }

    #[test]
    fn simulate_rejects_zero_fps() {
        assert!(simulate(1.0, 0, &[], &ShowcaseConfig::default(), None).is_err());
    }
}
