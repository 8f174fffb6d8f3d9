//! Staleness tracking for derived quantities.
//!
//! Rather than each context setter hand-listing the caches it invalidates, the
//! dependency of every derived quantity on context fields and on other derived
//! quantities is declared once in [`DEPENDENCIES`] / [`SLOT_DEPENDENCIES`].
//! A setter reports *which context field changed* and the stale set is derived
//! as the transitive closure over those tables, so a quantity can never be
//! forgotten when a new cache or setter is added.

use bitflags::bitflags;

bitflags! {
    /// Context fields a recompute can read. `PROJECTOR` stands for the
    /// per-slot texture projector binding of the slot in question.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ContextBits: u8 {
        const RENDERABLE = 1 << 0;
        const CAMERA = 1 << 1;
        const LIGHT_LIST = 1 << 2;
        const TARGET = 1 << 3;
        const SCENE = 1 << 4;
        const PROJECTOR = 1 << 5;
    }
}

bitflags! {
    /// Cached whole-draw quantities.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Dirty: u32 {
        const WORLD = 1 << 0;
        const VIEW = 1 << 1;
        const PROJ = 1 << 2;
        const WORLD_VIEW = 1 << 3;
        const VIEW_PROJ = 1 << 4;
        const WORLD_VIEW_PROJ = 1 << 5;
        const INVERSE_WORLD = 1 << 6;
        const INVERSE_VIEW = 1 << 7;
        const INVERSE_WORLD_VIEW = 1 << 8;
        const INVERSE_TRANSPOSE_WORLD = 1 << 9;
        const INVERSE_TRANSPOSE_WORLD_VIEW = 1 << 10;
        const CAMERA_POSITION = 1 << 11;
        const CAMERA_POSITION_OBJECT_SPACE = 1 << 12;
        const LOD_CAMERA_POSITION = 1 << 13;
        const LOD_CAMERA_POSITION_OBJECT_SPACE = 1 << 14;
        const SCENE_DEPTH_RANGE = 1 << 15;
    }
}

bitflags! {
    /// Cached per-light-slot quantities; each slot carries its own set.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SlotDirty: u8 {
        const TEXTURE_VIEW_PROJ = 1 << 0;
        const TEXTURE_WORLD_VIEW_PROJ = 1 << 1;
        const SPOTLIGHT_VIEW_PROJ = 1 << 2;
        const SPOTLIGHT_WORLD_VIEW_PROJ = 1 << 3;
        const SHADOW_DEPTH_RANGE = 1 << 4;
    }
}

struct Dep {
    quantity: Dirty,
    reads_context: ContextBits,
    reads_quantities: Dirty,
}

/// What each whole-draw quantity's recompute reads. The view matrix reads the
/// renderable because of the identity-view override; the projection reads the
/// render-target descriptor because of the texture-flip correction.
const DEPENDENCIES: &[Dep] = &[
    Dep {
        quantity: Dirty::WORLD,
        reads_context: ContextBits::RENDERABLE,
        reads_quantities: Dirty::empty(),
    },
    Dep {
        quantity: Dirty::VIEW,
        reads_context: ContextBits::CAMERA.union(ContextBits::RENDERABLE),
        reads_quantities: Dirty::empty(),
    },
    Dep {
        quantity: Dirty::PROJ,
        reads_context: ContextBits::CAMERA
            .union(ContextBits::RENDERABLE)
            .union(ContextBits::TARGET),
        reads_quantities: Dirty::empty(),
    },
    Dep {
        quantity: Dirty::WORLD_VIEW,
        reads_context: ContextBits::empty(),
        reads_quantities: Dirty::VIEW.union(Dirty::WORLD),
    },
    Dep {
        quantity: Dirty::VIEW_PROJ,
        reads_context: ContextBits::empty(),
        reads_quantities: Dirty::PROJ.union(Dirty::VIEW),
    },
    Dep {
        quantity: Dirty::WORLD_VIEW_PROJ,
        reads_context: ContextBits::empty(),
        reads_quantities: Dirty::PROJ.union(Dirty::WORLD_VIEW),
    },
    Dep {
        quantity: Dirty::INVERSE_WORLD,
        reads_context: ContextBits::empty(),
        reads_quantities: Dirty::WORLD,
    },
    Dep {
        quantity: Dirty::INVERSE_VIEW,
        reads_context: ContextBits::empty(),
        reads_quantities: Dirty::VIEW,
    },
    Dep {
        quantity: Dirty::INVERSE_WORLD_VIEW,
        reads_context: ContextBits::empty(),
        reads_quantities: Dirty::WORLD_VIEW,
    },
    Dep {
        quantity: Dirty::INVERSE_TRANSPOSE_WORLD,
        reads_context: ContextBits::empty(),
        reads_quantities: Dirty::INVERSE_WORLD,
    },
    Dep {
        quantity: Dirty::INVERSE_TRANSPOSE_WORLD_VIEW,
        reads_context: ContextBits::empty(),
        reads_quantities: Dirty::INVERSE_WORLD_VIEW,
    },
    Dep {
        quantity: Dirty::CAMERA_POSITION,
        reads_context: ContextBits::CAMERA,
        reads_quantities: Dirty::empty(),
    },
    Dep {
        quantity: Dirty::CAMERA_POSITION_OBJECT_SPACE,
        reads_context: ContextBits::CAMERA,
        reads_quantities: Dirty::INVERSE_WORLD,
    },
    Dep {
        quantity: Dirty::LOD_CAMERA_POSITION,
        reads_context: ContextBits::CAMERA,
        reads_quantities: Dirty::empty(),
    },
    Dep {
        quantity: Dirty::LOD_CAMERA_POSITION_OBJECT_SPACE,
        reads_context: ContextBits::CAMERA,
        reads_quantities: Dirty::INVERSE_WORLD,
    },
    Dep {
        quantity: Dirty::SCENE_DEPTH_RANGE,
        reads_context: ContextBits::CAMERA.union(ContextBits::SCENE),
        reads_quantities: Dirty::empty(),
    },
];

struct SlotDep {
    quantity: SlotDirty,
    reads_context: ContextBits,
    reads_quantities: SlotDirty,
}

/// Per-slot quantities additionally read whole-draw state: the world matrix
/// (hence `RENDERABLE`) for the world-view-proj products, and the camera's
/// near clip for the synthesized spotlight frustum.
const SLOT_DEPENDENCIES: &[SlotDep] = &[
    SlotDep {
        quantity: SlotDirty::TEXTURE_VIEW_PROJ,
        reads_context: ContextBits::PROJECTOR,
        reads_quantities: SlotDirty::empty(),
    },
    SlotDep {
        quantity: SlotDirty::TEXTURE_WORLD_VIEW_PROJ,
        reads_context: ContextBits::RENDERABLE,
        reads_quantities: SlotDirty::TEXTURE_VIEW_PROJ,
    },
    SlotDep {
        quantity: SlotDirty::SPOTLIGHT_VIEW_PROJ,
        reads_context: ContextBits::LIGHT_LIST.union(ContextBits::CAMERA),
        reads_quantities: SlotDirty::empty(),
    },
    SlotDep {
        quantity: SlotDirty::SPOTLIGHT_WORLD_VIEW_PROJ,
        reads_context: ContextBits::RENDERABLE,
        reads_quantities: SlotDirty::SPOTLIGHT_VIEW_PROJ,
    },
    SlotDep {
        quantity: SlotDirty::SHADOW_DEPTH_RANGE,
        reads_context: ContextBits::PROJECTOR.union(ContextBits::SCENE),
        reads_quantities: SlotDirty::empty(),
    },
];

/// Whole-draw quantities stale after a change to the given context fields:
/// the closure of direct readers over quantity-to-quantity edges.
pub fn invalidated_by(context: ContextBits) -> Dirty {
    let mut stale = Dirty::empty();
    loop {
        let mut grew = false;
        for dep in DEPENDENCIES {
            if !stale.contains(dep.quantity)
                && (dep.reads_context.intersects(context)
                    || dep.reads_quantities.intersects(stale))
            {
                stale |= dep.quantity;
                grew = true;
            }
        }
        if !grew {
            return stale;
        }
    }
}

/// Per-slot counterpart of [`invalidated_by`].
pub fn slot_invalidated_by(context: ContextBits) -> SlotDirty {
    let mut stale = SlotDirty::empty();
    loop {
        let mut grew = false;
        for dep in SLOT_DEPENDENCIES {
            if !stale.contains(dep.quantity)
                && (dep.reads_context.intersects(context)
                    || dep.reads_quantities.intersects(stale))
            {
                stale |= dep.quantity;
                grew = true;
            }
        }
        if !grew {
            return stale;
        }
    }
}
