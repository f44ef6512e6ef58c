//! Helpers shared by the DAT and LTA formats

pub mod hash;

pub use hash::hash_name_ic;
