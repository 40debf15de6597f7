use bevy::prelude::*;

use crate::rooms::RoomId;

pub const DEFAULT_TRIGGER_RADIUS: f32 = 2.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnchorKind {
    WarpPad(RoomId),
    Npc,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Anchor {
    pub kind: AnchorKind,
    pub position: Vec3,
    pub trigger_radius: f32,
}

impl Anchor {
    fn new(kind: AnchorKind, position: Vec3) -> Self {
        Self {
            kind,
            position,
            trigger_radius: DEFAULT_TRIGGER_RADIUS,
        }
    }
}

/// Interactive anchors in a fixed check order: red, green, cyan pad, then the star.
#[derive(Resource, Clone, Debug)]
pub struct ProximityIndex {
    anchors: Vec<Anchor>,
}

impl Default for ProximityIndex {
    fn default() -> Self {
        Self {
            anchors: vec![
                Anchor::new(AnchorKind::WarpPad(RoomId::RedDome), Vec3::new(11.0, 1.0, 0.0)),
                Anchor::new(AnchorKind::WarpPad(RoomId::GreenDome), Vec3::new(-11.0, 1.0, 0.0)),
                Anchor::new(AnchorKind::WarpPad(RoomId::CyanDome), Vec3::new(0.0, 1.0, 11.0)),
                Anchor::new(AnchorKind::Npc, Vec3::new(0.0, 4.0, 0.0)),
            ],
        }
    }
}

impl ProximityIndex {
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// First anchor, in declaration order, whose 3D distance to `point` is strictly
    /// below both `radius` and the anchor's own trigger radius.
    pub fn nearest_anchor_within(&self, point: Vec3, radius: f32) -> Option<&Anchor> {
        self.anchors.iter().find(|a| {
            let limit = radius.min(a.trigger_radius);
            point.distance(a.position) < limit
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_center_is_a_hit() {
        let index = ProximityIndex::default();
        for room in [RoomId::RedDome, RoomId::GreenDome, RoomId::CyanDome] {
            let pad = *index
                .anchors()
                .iter()
                .find(|a| a.kind == AnchorKind::WarpPad(room))
                .unwrap();
            let hit = index.nearest_anchor_within(pad.position, DEFAULT_TRIGGER_RADIUS);
            assert_eq!(hit.map(|a| a.kind), Some(AnchorKind::WarpPad(room)));
        }
    }

    #[test]
    fn boundary_distance_is_a_miss() {
        let index = ProximityIndex::default();
        // exactly 2.0 from the red pad, far from everything else
        let p = Vec3::new(13.0, 1.0, 0.0);
        assert!(index.nearest_anchor_within(p, DEFAULT_TRIGGER_RADIUS).is_none());
        assert!(index
            .nearest_anchor_within(Vec3::new(12.99, 1.0, 0.0), DEFAULT_TRIGGER_RADIUS)
            .is_some());
    }

    #[test]
    fn open_floor_is_a_miss() {
        let index = ProximityIndex::default();
        let p = Vec3::new(5.0, 0.0, -5.0);
        assert!(index.nearest_anchor_within(p, DEFAULT_TRIGGER_RADIUS).is_none());
    }

    #[test]
    fn star_is_reachable_at_hub_center() {
        let index = ProximityIndex::default();
        let hit = index.nearest_anchor_within(Vec3::new(0.0, 2.5, 0.0), DEFAULT_TRIGGER_RADIUS);
        assert_eq!(hit.map(|a| a.kind), Some(AnchorKind::Npc));
    }

    #[test]
    fn overlapping_anchors_resolve_in_declaration_order() {
        let mut index = ProximityIndex::default();
        // move the star onto the cyan pad
        index.anchors[3].position = Vec3::new(0.0, 1.0, 11.0);
        let hit = index.nearest_anchor_within(Vec3::new(0.0, 1.0, 11.0), DEFAULT_TRIGGER_RADIUS);
        assert_eq!(hit.map(|a| a.kind), Some(AnchorKind::WarpPad(RoomId::CyanDome)));
    }

    #[test]
    fn query_radius_narrows_the_trigger() {
        let index = ProximityIndex::default();
        let p = Vec3::new(12.5, 1.0, 0.0);
        assert!(index.nearest_anchor_within(p, 2.0).is_some());
        assert!(index.nearest_anchor_within(p, 1.0).is_none());
    }
}
