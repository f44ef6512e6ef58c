//! Conversion options
//!
//! Controls how a DAT file is decoded and where the LTA outputs land.

use crate::formats::dat::VertexLayout;
use std::path::{Path, PathBuf};

/// Options for one DAT to LTA conversion.
///
/// # Example
///
/// ```no_run
/// use dat2lta::converter::ConvertOptions;
/// use dat2lta::formats::VertexLayout;
///
/// let options = ConvertOptions::new(VertexLayout::WithTangents)
///     .with_texture_root("Game")
///     .with_output_dir("out");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Render vertex layout of the input file.
    pub layout: VertexLayout,

    /// Directory texture names are resolved against for UV reconstruction.
    /// If None, every texture size is unknown and polygons stay unmapped.
    pub texture_root: Option<PathBuf>,

    /// Where the three outputs are written.
    /// If None, they go next to the input file.
    pub output_dir: Option<PathBuf>,
}

impl ConvertOptions {
    #[must_use]
    pub fn new(layout: VertexLayout) -> Self {
        Self {
            layout,
            texture_root: None,
            output_dir: None,
        }
    }

    #[must_use]
    pub fn with_texture_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.texture_root = Some(root.into());
        self
    }

    #[must_use]
    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Output directory for `input`: the configured one, else the input's parent.
    #[must_use]
    pub fn output_dir_for(&self, input: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_defaults_to_input_parent() {
        let options = ConvertOptions::new(VertexLayout::Compact);
        assert_eq!(options.output_dir_for(Path::new("maps/level.dat")), PathBuf::from("maps"));
        assert_eq!(options.output_dir_for(Path::new("level.dat")), PathBuf::from("."));

        let options = options.with_output_dir("out");
        assert_eq!(options.output_dir_for(Path::new("maps/level.dat")), PathBuf::from("out"));
    }
}
