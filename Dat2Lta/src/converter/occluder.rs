//! Occluder classification by name

use crate::formats::dat::{OccluderKind, WorldGraph};

/// Name that marks a plain, static occluder.
pub const REGULAR_OCCLUDER_NAME: &str = "Occluder";

/// `Occluder` exactly (case-sensitive, untrimmed) is regular; anything else is dynamic.
#[must_use]
pub fn classify_occluder(name: &str) -> OccluderKind {
    if name == REGULAR_OCCLUDER_NAME {
        OccluderKind::Regular
    } else {
        OccluderKind::Dynamic
    }
}

/// Tag every occluder in the graph. Names are not changed.
pub fn classify_occluders(graph: &mut WorldGraph) {
    let mut dynamic = 0usize;
    for occluder in graph.occluders_mut() {
        let kind = classify_occluder(&occluder.name);
        if kind == OccluderKind::Dynamic {
            dynamic += 1;
        }
        occluder.kind = Some(kind);
    }
    tracing::debug!(dynamic, "Classified occluders");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_occluder() {
        assert_eq!(classify_occluder("Occluder"), OccluderKind::Regular);
        assert_eq!(classify_occluder("Occluder_02"), OccluderKind::Dynamic);
        assert_eq!(classify_occluder("WindowBreak"), OccluderKind::Dynamic);
        assert_eq!(classify_occluder("occluder"), OccluderKind::Dynamic);
        assert_eq!(classify_occluder(" Occluder"), OccluderKind::Dynamic);
    }
}
