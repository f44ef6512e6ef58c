//! CLI interface for DAT to LTA conversion
use std::cell::Cell;
use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{print_done, print_step, step_emoji};
use crate::converter::{ConvertOptions, convert_dat_to_lta_with_progress};
use crate::formats::VertexLayout;

const STEPS: usize = 4;

/// Run `convert`.
///
/// # Errors
/// Returns an error for a bad layout selector, a missing texture directory
/// or a failed conversion.
pub fn execute(
    dat: &Path,
    layout: &str,
    textures: &Path,
    output_dir: Option<&Path>,
    quiet: bool,
) -> anyhow::Result<()> {
    let layout: VertexLayout = layout.parse()?;
    if !textures.is_dir() {
        anyhow::bail!("Texture directory {} does not exist", textures.display());
    }

    let mut options = ConvertOptions::new(layout).with_texture_root(textures);
    if let Some(dir) = output_dir {
        options = options.with_output_dir(dir);
    }

    let start = Instant::now();
    let step = Cell::new(0usize);
    let report = convert_dat_to_lta_with_progress(dat, &options, &|msg| {
        step.set(step.get() + 1);
        if !quiet {
            print_step(step.get(), STEPS, step_emoji(step.get()), msg);
        }
    })?;

    if !quiet {
        println!("  {}", report.main_lta.display());
        println!("  {}", report.physics_lta.display());
        println!("  {}", report.debug_txt.display());
        print_done(start.elapsed());
    }
    Ok(())
}
