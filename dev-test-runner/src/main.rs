//! Load a scene document (or the embedded sample), map it into the scene
//! model and print what was read.
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use struct_mapping::scene::{self, Source};
use struct_mapping::{ensure_registered, map_struct_to_json_pretty};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(scene::DEFAULT_DOCUMENT_PATH));

    ensure_registered::<scene::Elements>().context("scene model registration")?;

    let (elements, source) = scene::load(&path)
        .with_context(|| format!("failed to map scene document {}", path.display()))?;
    match &source {
        Source::File(path) => tracing::info!(path = %path.display(), "mapped document from file"),
        Source::Embedded => tracing::info!("mapped embedded sample document"),
    }
    tracing::info!(shapes = elements.len(), "data initialization completed");

    for (kind, count) in elements.count_by_type() {
        println!("{kind:<12} {count}");
    }
    for (i, shape) in elements.elements.iter().enumerate() {
        let p = shape.props;
        if shape.is_rectangle() {
            println!("[{i}] rect  x={} y={} w={} h={} stroke={}", p.x, p.y, p.width, p.height, shape.stroke_width);
        } else if shape.is_text() {
            let value = shape.value.as_deref().unwrap_or_default();
            println!("[{i}] text  x={} y={} {value:?}", p.x, p.y);
        } else {
            println!("[{i}] {}  (not drawn)", shape.kind);
        }
    }

    if std::env::var_os("DEV_TEST_RUNNER_ECHO").is_some() {
        println!("{}", map_struct_to_json_pretty(&elements, 4)?);
    }
    Ok(())
}
