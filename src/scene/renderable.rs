use glam::Mat4;

/// Per-draw state of the object being rendered: its world transform array and
/// the identity-view/identity-projection overrides used by screen-space draws.
///
/// The transform array always holds at least one entry. Skinned and instanced
/// draws carry one matrix per bone or instance; entry 0 is the object's own
/// world matrix.
#[derive(Clone, Debug)]
pub struct RenderableState {
    world_transforms: Vec<Mat4>,
    pub use_identity_view: bool,
    pub use_identity_projection: bool,
}

impl RenderableState {
    pub fn new(world: Mat4) -> Self {
        Self {
            world_transforms: vec![world],
            use_identity_view: false,
            use_identity_projection: false,
        }
    }

    pub fn with_transforms(world_transforms: Vec<Mat4>) -> Self {
        let world_transforms = if world_transforms.is_empty() {
            log::warn!("renderable created with no world transforms, substituting identity");
            vec![Mat4::IDENTITY]
        } else {
            world_transforms
        };
        Self {
            world_transforms,
            use_identity_view: false,
            use_identity_projection: false,
        }
    }

    /// Marks this renderable as drawing in clip space, skipping the camera's
    /// view and projection.
    pub fn screen_space(mut self) -> Self {
        self.use_identity_view = true;
        self.use_identity_projection = true;
        self
    }

    pub fn world_transforms(&self) -> &[Mat4] {
        &self.world_transforms
    }
}

impl Default for RenderableState {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_transform_list_is_replaced_with_identity() {
        let r = RenderableState::with_transforms(Vec::new());
        assert_eq!(r.world_transforms().len(), 1);
        assert_eq!(r.world_transforms()[0], Mat4::IDENTITY);
    }

    #[test]
    fn screen_space_sets_both_identity_flags() {
        let r = RenderableState::default().screen_space();
        assert!(r.use_identity_view);
        assert!(r.use_identity_projection);
    }
}
