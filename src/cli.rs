// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "path-tracer")]
#[command(about = "Progressive GPU path tracer", long_about = None)]
pub struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// glTF scene to load as mesh objects
    #[arg(long)]
    pub gltf: Option<PathBuf>,

    /// Equirectangular skybox image (.hdr, .png or .jpg)
    #[arg(long)]
    pub skybox: Option<PathBuf>,

    /// Number of sphere slots to fill
    #[arg(long)]
    pub spheres: Option<u32>,

    /// RNG seed for a reproducible scene
    #[arg(long)]
    pub seed: Option<u64>,

    /// Do not add the built-in pyramid and box
    #[arg(long = "no-demo-meshes", default_value = "false")]
    pub no_demo_meshes: bool,

    /// Render offscreen and write the result to --output
    #[arg(long, default_value = "false")]
    pub headless: bool,

    /// Frames to accumulate in headless mode (at least one)
    #[arg(long, default_value = "64", value_parser = clap::value_parser!(u32).range(1..))]
    pub frames: u32,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Headless output image; .hdr keeps float radiance
    #[arg(long, default_value = "render.png")]
    pub output: PathBuf,
}
