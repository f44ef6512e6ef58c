//! DAT to LTA conversion
//!
//! The decoded [`WorldGraph`] goes through the defaulting pass and the
//! occluder classifier, then is rendered three ways:
//! - `<map>.lta` - the editable world, one brush per render section
//! - `<map>_PhysicsDATA.lta` - the world tree brushes without texturing
//! - `<map>.txt` - a debug dump of every decoded section

mod debug_dump;
mod defaults;
mod main_lta;
mod occluder;
mod options;
mod physics_lta;
mod proplist;
mod uv;

use crate::error::{Error, Result};
use crate::formats::dat::{GraphSummary, WorldGraph, read_dat};
use crate::formats::dtx::TextureSizes;
use crate::formats::lta::serialize_lta;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub use debug_dump::debug_dump;
pub use defaults::apply_defaults;
pub use main_lta::build_main_lta;
pub use occluder::{REGULAR_OCCLUDER_NAME, classify_occluder, classify_occluders};
pub use options::ConvertOptions;
pub use physics_lta::{PHYSICS_SUFFIX, build_physics_lta};
pub use proplist::quat_to_euler;
pub use uv::{UNMAPPED_SPACE, texture_space};

/// Progress callback type for conversion operations.
/// The callback receives a message describing the current step.
pub type ProgressCallback<'a> = &'a dyn Fn(&str);

/// The three rendered outputs, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutputs {
    pub main: String,
    pub physics: String,
    pub debug: String,
}

/// Where a conversion wrote its files, plus what it decoded.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub main_lta: PathBuf,
    pub physics_lta: PathBuf,
    pub debug_txt: PathBuf,
    /// Render attribute values filled in by the defaulting pass.
    pub defaults_inserted: usize,
    pub summary: GraphSummary,
}

/// Render all three outputs for a decoded and prepared graph.
///
/// # Errors
/// Returns an error if any of the texts cannot be rendered.
pub fn render_outputs(
    graph: &WorldGraph,
    map_name: &str,
    textures: &mut TextureSizes,
) -> Result<ConversionOutputs> {
    let main = serialize_lta(&build_main_lta(graph, map_name, textures))?;
    let physics = serialize_lta(&build_physics_lta(graph, map_name))?;
    let debug = debug_dump(graph)?;
    Ok(ConversionOutputs {
        main,
        physics,
        debug,
    })
}

/// Convert a DAT file into its three LTA outputs.
///
/// # Errors
/// Returns an error if the input cannot be read or decoded, or if any output
/// cannot be written. No output is left behind on failure.
pub fn convert_dat_to_lta<P: AsRef<Path>>(
    input: P,
    options: &ConvertOptions,
) -> Result<ConversionReport> {
    convert_dat_to_lta_with_progress(input, options, &|_| {})
}

/// Convert a DAT file into its three LTA outputs with progress callback.
///
/// # Errors
/// Returns an error if the input cannot be read or decoded, or if any output
/// cannot be written. No output is left behind on failure.
pub fn convert_dat_to_lta_with_progress<P: AsRef<Path>>(
    input: P,
    options: &ConvertOptions,
    progress: ProgressCallback,
) -> Result<ConversionReport> {
    let input = input.as_ref();
    let map_name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidPath(input.display().to_string()))?
        .to_string();

    tracing::info!("Converting {} ({} layout)", input.display(), options.layout);

    progress("Decoding DAT...");
    let mut graph = read_dat(input, options.layout)?;

    progress("Preparing world graph...");
    let defaults_inserted = apply_defaults(&mut graph);
    classify_occluders(&mut graph);

    progress("Rendering LTA...");
    let mut textures = TextureSizes::new(options.texture_root.clone());
    let outputs = render_outputs(&graph, &map_name, &mut textures)?;

    progress("Writing output files...");
    let dir = options.output_dir_for(input);
    std::fs::create_dir_all(&dir).map_err(|source| Error::OutputWriteFailure {
        path: dir.clone(),
        source,
    })?;

    let main_lta = dir.join(format!("{map_name}.lta"));
    let physics_lta = dir.join(format!("{map_name}{PHYSICS_SUFFIX}.lta"));
    let debug_txt = dir.join(format!("{map_name}.txt"));

    // All three are staged before any is moved into place
    let staged = vec![
        stage(&dir, &main_lta, &outputs.main)?,
        stage(&dir, &physics_lta, &outputs.physics)?,
        stage(&dir, &debug_txt, &outputs.debug)?,
    ];
    persist_all(staged)?;

    tracing::info!("Wrote {}, {} and {}", main_lta.display(), physics_lta.display(), debug_txt.display());

    Ok(ConversionReport {
        main_lta,
        physics_lta,
        debug_txt,
        defaults_inserted,
        summary: graph.summary(),
    })
}

/// A rendered output waiting in a temporary file beside its target.
struct StagedOutput {
    file: NamedTempFile,
    target: PathBuf,
    /// What the target held before this run, `None` if it did not exist.
    previous: Option<Vec<u8>>,
}

fn stage(dir: &Path, target: &Path, contents: &str) -> Result<StagedOutput> {
    let failure = |source| Error::OutputWriteFailure {
        path: target.to_path_buf(),
        source,
    };
    let previous = if target.is_file() {
        Some(std::fs::read(target).map_err(failure)?)
    } else {
        None
    };
    let mut file = NamedTempFile::new_in(dir).map_err(failure)?;
    file.write_all(contents.as_bytes()).map_err(failure)?;
    file.flush().map_err(failure)?;
    Ok(StagedOutput {
        file,
        target: target.to_path_buf(),
        previous,
    })
}

/// Move every staged output into place. If one fails, the targets already
/// replaced get their previous contents back (or are removed) before the
/// error is returned; the remaining temporary files are dropped.
fn persist_all(staged: Vec<StagedOutput>) -> Result<()> {
    let mut done: Vec<(PathBuf, Option<Vec<u8>>)> = Vec::with_capacity(staged.len());
    for output in staged {
        match output.file.persist(&output.target) {
            Ok(_) => done.push((output.target, output.previous)),
            Err(e) => {
                for (path, previous) in done.into_iter().rev() {
                    roll_back(&path, previous.as_deref());
                }
                return Err(Error::OutputWriteFailure {
                    path: output.target,
                    source: e.error,
                });
            }
        }
    }
    Ok(())
}

fn roll_back(path: &Path, previous: Option<&[u8]>) {
    let result = match previous {
        Some(contents) => std::fs::write(path, contents),
        None => std::fs::remove_file(path),
    };
    if let Err(e) = result {
        tracing::warn!(path = %path.display(), error = %e, "Could not roll back output");
    }
}
