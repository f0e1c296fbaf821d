//! Modelhub - marketplace asset pipeline
//!
//! Command-line entry point for converting uploads to GLB and warming the
//! viewer library.

mod settings;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use modelhub_assets::{compose_scene, ConvertMode, MeshConverter, RawAsset};
use modelhub_viewer::{HttpLibraryFetcher, ViewerLibraryLoader};

use crate::settings::Settings;

/// Marketplace asset pipeline
#[derive(Parser, Debug)]
#[command(name = "modelhub")]
#[command(about = "Convert STL/OBJ uploads to GLB and warm the 3D viewer library")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an STL/OBJ upload to GLB
    Convert {
        /// Path to a .stl or .obj file
        input: PathBuf,

        /// Output path, defaults to the input with a .glb extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also register a preview object URL
        #[arg(long)]
        preview: bool,
    },
    /// Print mesh statistics
    Inspect {
        /// Path to a .stl or .obj file
        input: PathBuf,
    },
    /// Load the viewer library once
    FetchViewer,
    /// Print the current settings
    Settings {
        /// Write the settings file instead of printing it
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    let settings = Settings::load();

    match cli.command {
        Command::Convert { input, output, preview } => convert(&settings, &input, output, preview).await,
        Command::Inspect { input } => inspect(&settings, &input),
        Command::FetchViewer => fetch_viewer(&settings).await,
        Command::Settings { save } => {
            if save {
                let path = settings.save()?;
                println!("Wrote {}", path.display());
            } else {
                print!("{}", toml::to_string_pretty(&settings)?);
            }
            Ok(())
        }
    }
}

/// Read an upload from disk, applying the upload policy first.
fn read_upload(settings: &Settings, path: &Path) -> Result<RawAsset> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid file name: {}", path.display()))?
        .to_string();

    let size = fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    settings.upload.check(&filename, size)?;

    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(RawAsset::new(filename, bytes))
}

async fn convert(settings: &Settings, input: &Path, output: Option<PathBuf>, preview: bool) -> Result<()> {
    let asset = read_upload(settings, input)?;
    let converter = MeshConverter::new();
    let mode = if preview { ConvertMode::Preview } else { ConvertMode::Final };

    let converted = match converter.convert(&asset, mode).await {
        Ok(converted) => converted,
        Err(e) if e.is_user_correctable() => {
            warn!("Conversion failed: {}", e);
            bail!("{}", e.user_message());
        }
        Err(e) => {
            error!("Conversion failed: {}", e);
            bail!("{}", e.user_message());
        }
    };

    let output = output.unwrap_or_else(|| input.with_extension("glb"));
    fs::write(&output, converted.blob.bytes()).with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {} ({} bytes)", output.display(), converted.blob.len());

    if let Some(url) = converted.object_url {
        println!("Preview URL: {}", url);
        converter.revoke(&url);
    }
    Ok(())
}

fn inspect(settings: &Settings, input: &Path) -> Result<()> {
    let asset = read_upload(settings, input)?;
    let scene = compose_scene(&asset)?;
    let geometry = &scene.mesh.geometry;
    let size = scene.source_bounds.size();

    println!("{}", asset.filename);
    println!("  triangles: {}", geometry.triangle_count());
    println!("  vertices:  {}", geometry.vertex_count());
    println!(
        "  bounds:    [{:.3}, {:.3}, {:.3}] - [{:.3}, {:.3}, {:.3}]",
        scene.source_bounds.min.x,
        scene.source_bounds.min.y,
        scene.source_bounds.min.z,
        scene.source_bounds.max.x,
        scene.source_bounds.max.y,
        scene.source_bounds.max.z,
    );
    println!("  size:      {:.3} x {:.3} x {:.3}", size.x, size.y, size.z);
    Ok(())
}

async fn fetch_viewer(settings: &Settings) -> Result<()> {
    let fetcher = HttpLibraryFetcher::new(settings.viewer.library_url.clone())?;
    info!("Fetching viewer library from {}", fetcher.url());

    let loader = ViewerLibraryLoader::new(fetcher, settings.viewer.loader.clone());
    let signal = loader.ensure_loaded(settings.viewer.strategy);
    loader.load_now().await?;
    signal.wait().await?;

    println!("Viewer library ready");
    Ok(())
}
