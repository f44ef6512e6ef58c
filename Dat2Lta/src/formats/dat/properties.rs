//! Typed property bags attached to objects, brushes and render nodes

use glam::{Quat, Vec3};
use indexmap::IndexMap;

/// Property type codes as stored in the object section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Vector,
    Color,
    Real,
    Bool,
    LongInt,
    Rotation,
    /// Any other code; the value is kept as raw bytes.
    Unknown(u8),
}

impl PropertyKind {
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::String,
            1 => Self::Vector,
            2 => Self::Color,
            3 => Self::Real,
            5 => Self::Bool,
            6 => Self::LongInt,
            7 => Self::Rotation,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::String => 0,
            Self::Vector => 1,
            Self::Color => 2,
            Self::Real => 3,
            Self::Bool => 5,
            Self::LongInt => 6,
            Self::Rotation => 7,
            Self::Unknown(code) => code,
        }
    }

    /// Keyword used for this type in LTA property lists.
    #[must_use]
    pub const fn lta_keyword(self) -> &'static str {
        match self {
            Self::String | Self::Unknown(_) => "string",
            Self::Vector => "vector",
            Self::Color => "color",
            Self::Real => "real",
            Self::Bool => "bool",
            Self::LongInt => "longint",
            Self::Rotation => "rotation",
        }
    }
}

/// A decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Vector(Vec3),
    Color(Vec3),
    Real(f32),
    Bool(bool),
    /// Stored as a float in the file despite the name.
    LongInt(f32),
    Rotation(Quat),
    /// Uninterpreted payload of an unknown type code.
    Raw { data_type: u8, bytes: Vec<u8> },
}

impl PropertyValue {
    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::String(_) => PropertyKind::String,
            Self::Vector(_) => PropertyKind::Vector,
            Self::Color(_) => PropertyKind::Color,
            Self::Real(_) => PropertyKind::Real,
            Self::Bool(_) => PropertyKind::Bool,
            Self::LongInt(_) => PropertyKind::LongInt,
            Self::Rotation(_) => PropertyKind::Rotation,
            Self::Raw { data_type, .. } => PropertyKind::Unknown(*data_type),
        }
    }
}

/// One named property with its file flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub flags: u32,
    pub value: PropertyValue,
}

impl Property {
    #[must_use]
    pub fn new(value: PropertyValue) -> Self {
        Self { flags: 0, value }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        self.value.kind()
    }
}

/// Insertion-ordered set of named properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    entries: IndexMap<String, Property>,
}

impl PropertyBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.entries.get(name)
    }

    /// Insert or replace, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, property: Property) -> Option<Property> {
        self.entries.insert(name.into(), property)
    }

    pub fn set(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.insert(name, Property::new(value));
    }

    /// Insert only when the name is not present yet. Returns whether it was added.
    pub fn set_if_absent(&mut self, name: &str, value: PropertyValue) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(name.to_string(), Property::new(value));
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<Property> {
        self.entries.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// String value of `name`, if it is a string property.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name).map(|p| &p.value) {
            Some(PropertyValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name).map(|p| &p.value) {
            Some(PropertyValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_vec3(&self, name: &str) -> Option<Vec3> {
        match self.get(name).map(|p| &p.value) {
            Some(PropertyValue::Vector(v) | PropertyValue::Color(v)) => Some(*v),
            _ => None,
        }
    }
}

impl FromIterator<(String, Property)> for PropertyBag {
    fn from_iter<T: IntoIterator<Item = (String, Property)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
