//! Per-vertex record layouts of the render data
//!
//! Jupiter v85 maps exist in two flavours that differ only in whether each
//! render vertex carries a tangent and binormal. The file does not say which
//! one it is, so the caller picks the layout explicitly.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// One field of a render vertex record, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexField {
    Position,
    Uv0,
    Uv1,
    Color,
    Normal,
    Tangent,
    Binormal,
}

impl VertexField {
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Uv0 | Self::Uv1 => 8,
            Self::Color => 4,
            Self::Position | Self::Normal | Self::Tangent | Self::Binormal => 12,
        }
    }
}

const FIELDS_WITH_TANGENTS: &[VertexField] = &[
    VertexField::Position,
    VertexField::Uv0,
    VertexField::Uv1,
    VertexField::Color,
    VertexField::Normal,
    VertexField::Tangent,
    VertexField::Binormal,
];

const FIELDS_COMPACT: &[VertexField] = &[
    VertexField::Position,
    VertexField::Uv0,
    VertexField::Uv1,
    VertexField::Color,
    VertexField::Normal,
];

/// Render vertex layout selected with `v1` / `v2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexLayout {
    /// `v1`: tangent and binormal follow the normal (68 bytes).
    WithTangents,
    /// `v2`: no tangent space (44 bytes).
    #[default]
    Compact,
}

impl VertexLayout {
    /// Fields of one vertex record in file order.
    #[must_use]
    pub const fn fields(self) -> &'static [VertexField] {
        match self {
            Self::WithTangents => FIELDS_WITH_TANGENTS,
            Self::Compact => FIELDS_COMPACT,
        }
    }

    /// Byte size of one vertex record.
    #[must_use]
    pub const fn stride(self) -> usize {
        match self {
            Self::WithTangents => 68,
            Self::Compact => 44,
        }
    }

    #[must_use]
    pub const fn has_tangents(self) -> bool {
        matches!(self, Self::WithTangents)
    }

    #[must_use]
    pub const fn selector(self) -> &'static str {
        match self {
            Self::WithTangents => "v1",
            Self::Compact => "v2",
        }
    }
}

impl FromStr for VertexLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "v1" | "-v1" => Ok(Self::WithTangents),
            "v2" | "-v2" => Ok(Self::Compact),
            other => Err(Error::UnsupportedVersionSelector(other.to_string())),
        }
    }
}

impl fmt::Display for VertexLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_matches_fields() {
        for layout in [VertexLayout::WithTangents, VertexLayout::Compact] {
            let total: usize = layout.fields().iter().map(|f| f.size()).sum();
            assert_eq!(total, layout.stride(), "{layout}");
        }
    }

    #[test]
    fn test_parse_selector() {
        assert_eq!("v1".parse::<VertexLayout>().unwrap(), VertexLayout::WithTangents);
        assert_eq!("-v2".parse::<VertexLayout>().unwrap(), VertexLayout::Compact);
        assert!(VertexLayout::WithTangents.has_tangents());
        assert!(!VertexLayout::Compact.has_tangents());
    }

    #[test]
    fn test_unknown_selector_is_rejected() {
        for bad in ["v3", "V1", "", " v1"] {
            match bad.parse::<VertexLayout>() {
                Err(Error::UnsupportedVersionSelector(s)) => assert_eq!(s, bad),
                other => panic!("expected UnsupportedVersionSelector for {bad:?}, got {other:?}"),
            }
        }
    }
}
