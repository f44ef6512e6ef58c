//! Texture dimension lookup
//!
//! Only the pixel size of a texture is needed to rebuild texture space, so
//! this reads the DTX header fields and nothing else. Sprites (`.spr`) name
//! their first frame's DTX, which is followed.

use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

const DTX_SIZE_OFFSET: u64 = 8;
const SPR_FRAME_OFFSET: u64 = 20;

/// Width and height from a DTX header.
///
/// # Errors
/// Returns an error if the data is shorter than the header fields.
pub fn parse_dtx_size(data: &[u8], path: &Path) -> Result<(u32, u32)> {
    let mut cursor = Cursor::new(data);
    cursor.set_position(DTX_SIZE_OFFSET);
    let width = cursor.read_u16::<LittleEndian>();
    let height = cursor.read_u16::<LittleEndian>();
    match (width, height) {
        (Ok(w), Ok(h)) => Ok((u32::from(w), u32::from(h))),
        _ => Err(Error::InvalidTextureHeader {
            path: path.to_path_buf(),
            message: format!("{} bytes is too short for a DTX header", data.len()),
        }),
    }
}

/// DTX path of a sprite's first frame.
///
/// # Errors
/// Returns an error if the data is shorter than the frame name.
pub fn parse_spr_frame(data: &[u8], path: &Path) -> Result<String> {
    let short = || Error::InvalidTextureHeader {
        path: path.to_path_buf(),
        message: "sprite frame name is truncated".to_string(),
    };
    let mut cursor = Cursor::new(data);
    cursor.set_position(SPR_FRAME_OFFSET);
    let len = usize::from(cursor.read_u16::<LittleEndian>().map_err(|_| short())?);
    let start = (SPR_FRAME_OFFSET + 2) as usize;
    let bytes = data.get(start..start + len).ok_or_else(short)?;
    Ok(normalize_texture_path(&String::from_utf8_lossy(bytes)))
}

/// Forward slashes, lower case: the engine resolves paths case-insensitively.
fn normalize_texture_path(name: &str) -> String {
    name.replace('\\', "/").to_lowercase()
}

/// Cached texture size lookup under a game resource directory.
#[derive(Debug, Default)]
pub struct TextureSizes {
    root: Option<PathBuf>,
    cache: HashMap<String, (u32, u32)>,
}

impl TextureSizes {
    /// Lookups resolve against `root`; with `None` every size is unknown.
    #[must_use]
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            cache: HashMap::new(),
        }
    }

    /// Pixel size of `name`, or `(0, 0)` when unknown.
    ///
    /// Missing or unreadable textures are logged once and reported as unknown.
    pub fn size_of(&mut self, name: &str) -> (u32, u32) {
        let lower = name.to_lowercase();
        if lower.starts_with("lightanim") || lower.starts_with("default") {
            return (0, 0);
        }
        if let Some(size) = self.cache.get(name) {
            return *size;
        }
        let size = match &self.root {
            Some(root) => match lookup(root, name) {
                Ok(Some(size)) => size,
                Ok(None) => {
                    tracing::warn!(texture = name, "Texture not found, using default texture space");
                    (0, 0)
                }
                Err(e) => {
                    tracing::warn!(texture = name, error = %e, "Can't read texture");
                    (0, 0)
                }
            },
            None => (0, 0),
        };
        self.cache.insert(name.to_string(), size);
        size
    }
}

/// Try the name as given, then lower-cased.
fn resolve(root: &Path, relative: &str) -> Option<PathBuf> {
    let forward = relative.replace('\\', "/");
    [forward.clone(), forward.to_lowercase()]
        .into_iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.is_file())
}

fn lookup(root: &Path, name: &str) -> Result<Option<(u32, u32)>> {
    let Some(mut path) = resolve(root, name) else {
        return Ok(None);
    };

    if name.to_lowercase().ends_with(".spr") {
        let data = std::fs::read(&path)?;
        let frame = parse_spr_frame(&data, &path)?;
        match resolve(root, &frame) {
            Some(dtx) => path = dtx,
            None => {
                tracing::warn!(sprite = name, frame = %frame, "DTX inside SPR not found");
                return Ok(None);
            }
        }
    }

    let data = std::fs::read(&path)?;
    parse_dtx_size(&data, &path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn dtx_bytes(width: u16, height: u16) -> Vec<u8> {
        let mut data = vec![0u8; 8];
        data.extend_from_slice(&width.to_le_bytes());
        data.extend_from_slice(&height.to_le_bytes());
        data.extend_from_slice(&[0u8; 16]);
        data
    }

    #[test]
    fn test_parse_dtx_size() {
        let size = parse_dtx_size(&dtx_bytes(256, 128), Path::new("a.dtx")).unwrap();
        assert_eq!(size, (256, 128));
        assert!(parse_dtx_size(&[0u8; 9], Path::new("a.dtx")).is_err());
    }

    #[test]
    fn test_lookup_follows_sprite() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("tex")).unwrap();
        fs::write(dir.path().join("tex/water.dtx"), dtx_bytes(64, 32)).unwrap();

        let frame = b"Tex\\Water.dtx";
        let mut spr = vec![0u8; 20];
        spr.extend_from_slice(&(frame.len() as u16).to_le_bytes());
        spr.extend_from_slice(frame);
        fs::write(dir.path().join("tex/water.spr"), spr).unwrap();

        let mut sizes = TextureSizes::new(Some(dir.path().to_path_buf()));
        assert_eq!(sizes.size_of("tex/water.dtx"), (64, 32));
        assert_eq!(sizes.size_of("Tex\\Water.spr"), (64, 32));
        assert_eq!(sizes.size_of("tex/missing.dtx"), (0, 0));
    }

    #[test]
    fn test_reserved_names_have_no_size() {
        let mut sizes = TextureSizes::new(None);
        assert_eq!(sizes.size_of("LightAnim_Base"), (0, 0));
        assert_eq!(sizes.size_of("Default"), (0, 0));
        assert_eq!(sizes.size_of("tex/wall.dtx"), (0, 0));
    }
}
