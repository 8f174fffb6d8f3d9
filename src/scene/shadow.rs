/// Source of cascade (PSSM) shadow parameters, implemented by whatever node in
/// the render graph owns the shadow maps. Every accessor is optional: a shadow
/// map index with no data simply yields `None` and the resolver substitutes
/// zeroed sentinels.
pub trait ShadowNode {
    fn pssm_splits(&self, shadow_map_idx: usize) -> Option<&[f32]>;
    fn pssm_blends(&self, shadow_map_idx: usize) -> Option<&[f32]>;
    fn pssm_fade(&self, shadow_map_idx: usize) -> Option<f32>;
}

/// Cascade parameters for one shadow map.
#[derive(Clone, Debug, Default)]
pub struct CascadeData {
    pub splits: Vec<f32>,
    pub blends: Vec<f32>,
    pub fade: f32,
}

/// Fixed cascade data, one entry per shadow map.
#[derive(Clone, Debug, Default)]
pub struct StaticShadowNode {
    maps: Vec<CascadeData>,
}

impl StaticShadowNode {
    pub fn new(maps: Vec<CascadeData>) -> Self {
        Self { maps }
    }
}

impl ShadowNode for StaticShadowNode {
    fn pssm_splits(&self, shadow_map_idx: usize) -> Option<&[f32]> {
        self.maps
            .get(shadow_map_idx)
            .filter(|m| !m.splits.is_empty())
            .map(|m| m.splits.as_slice())
    }

    fn pssm_blends(&self, shadow_map_idx: usize) -> Option<&[f32]> {
        self.maps
            .get(shadow_map_idx)
            .filter(|m| !m.blends.is_empty())
            .map(|m| m.blends.as_slice())
    }

    fn pssm_fade(&self, shadow_map_idx: usize) -> Option<f32> {
        self.maps.get(shadow_map_idx).map(|m| m.fade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_map_index_yields_none() {
        let node = StaticShadowNode::new(vec![CascadeData {
            splits: vec![0.0, 4.0, 12.0, 40.0],
            blends: vec![3.5, 11.0],
            fade: 0.8,
        }]);
        assert!(node.pssm_splits(0).is_some());
        assert!(node.pssm_splits(1).is_none());
        assert!(node.pssm_fade(1).is_none());
    }

    #[test]
    fn empty_split_list_counts_as_absent() {
        let node = StaticShadowNode::new(vec![CascadeData::default()]);
        assert!(node.pssm_splits(0).is_none());
        assert!(node.pssm_blends(0).is_none());
        assert_eq!(node.pssm_fade(0), Some(0.0));
    }
}
