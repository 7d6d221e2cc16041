use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;
use winit::event_loop::EventLoop;

use path_tracer::app::App;
use path_tracer::cli::Cli;
use path_tracer::config::TracerConfig;
use path_tracer::core::{AccumulationCoordinator, FrameReport, GpuBackend, GpuContext};
use path_tracer::environment::Environment;
use path_tracer::loaders::Skybox;
use path_tracer::output::save_image;

fn run_headless(cli: &Cli, config: &TracerConfig, mut env: Environment, skybox: Skybox) -> Result<()> {
    let gpu = pollster::block_on(GpuContext::new())?;
    let backend = GpuBackend::offscreen(gpu, &skybox);
    let mut coordinator =
        AccumulationCoordinator::new(backend, config.spheres.clone(), config.rng(), &mut env)?;

    let extent = config.extent();
    for _ in 0..cli.frames {
        coordinator.tick(&mut env)?;
        if let FrameReport::Rendered { sample_count, .. } = coordinator.render_frame(&env, extent)? {
            log::debug!("Accumulated sample {}", sample_count);
        }
    }

    let image = coordinator
        .backend()
        .read_display()
        .context("Failed to read back the rendered image")?;
    save_image(&image, &cli.output)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = TracerConfig::from_cli(&cli)?;
    let env = config.environment(config.scene.mesh_objects()?);
    let skybox = config.scene.skybox();

    if cli.headless {
        info!("Rendering {} frames offscreen at {}x{}", cli.frames, config.output.width, config.output.height);
        return run_headless(&cli, &config, env, skybox);
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, env, skybox);

    info!("Path Tracer - Controls: WASD, Q/E turn, Space/Shift, +/- field of view, R regenerate, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
