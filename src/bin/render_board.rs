use std::fmt::Display;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use boardview::{MissPolicy, RenderConfig, RenderEngine, SceneManager, SceneManifest};

#[derive(Clone, Copy, Debug)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl std::str::FromStr for Dimensions {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut split_it = s.split('x');
        let (Some(a), Some(b), None) = (split_it.next(), split_it.next(), split_it.next()) else {
            return Err(anyhow::anyhow!("Incorrect format, expected WIDTHxHEIGHT"));
        };
        let width: u32 = a.parse()?;
        let height: u32 = b.parse()?;
        if width == 0 || height == 0 {
            return Err(anyhow::anyhow!("Dimensions must be non-zero"));
        }

        Ok(Dimensions { width, height })
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}x{}", self.width, self.height))
    }
}

#[derive(Parser, Debug)]
#[command(about = "Render the circuit board scene to a PNG")]
pub struct Args {
    #[arg(short, long)]
    /// Scene manifest (JSON); the built-in board when omitted
    manifest: Option<PathBuf>,

    #[arg(short, long, default_value = "assets")]
    /// Directory the manifest's texture paths are relative to
    assets: PathBuf,

    #[arg(short, long)]
    /// Render configuration (JSON)
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "board.png")]
    /// Output image path
    output: PathBuf,

    #[arg(short, long)]
    /// Output dimension in format `width`x`height`
    size: Option<Dimensions>,

    #[arg(long)]
    /// Abort on the first missing texture or material
    strict: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RenderConfig::from_path(path)
            .with_context(|| format!("Could not load config {}", path.display()))?,
        None => RenderConfig::default(),
    };
    if let Some(size) = args.size {
        config = config.with_size(size.width, size.height);
    }
    if args.strict {
        config = config.with_miss_policy(MissPolicy::FailFast);
    }

    let manifest = match &args.manifest {
        Some(path) => SceneManifest::from_path(path)
            .with_context(|| format!("Could not load manifest {}", path.display()))?,
        None => SceneManifest::builtin().context("Built-in manifest is invalid")?,
    };

    log::info!(
        "Rendering {} parts at {}x{}",
        manifest.parts.len(),
        config.width,
        config.height
    );

    let mut engine = pollster::block_on(RenderEngine::new_headless(&config))
        .context("Could not create the render engine")?;
    let mut scene = SceneManager::new(manifest, &config);

    let report = scene
        .prepare_scene(&mut engine, &args.assets)
        .context("Scene preparation failed")?;
    if !report.textures_failed.is_empty() {
        log::warn!(
            "{} textures could not be loaded from {}: {}",
            report.textures_failed.len(),
            args.assets.display(),
            report.textures_failed.join(", ")
        );
    }

    let stats = engine.render(&mut scene).context("Rendering failed")?;
    engine
        .save_png(&args.output)
        .with_context(|| format!("Could not save {}", args.output.display()))?;
    scene.release(&mut engine);

    log::info!(
        "{} draw calls, {} texture misses, {} material misses",
        stats.draw_calls,
        stats.texture_misses,
        stats.material_misses
    );
    Ok(())
}
