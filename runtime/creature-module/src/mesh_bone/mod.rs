//! Mesh and bone math for creatures
//!
//! This module is the deformation backend used by the playback layer:
//! - Bones as rigid 2D segments with rest and posed positions
//! - Render regions binding weighted bones to runs of mesh points
//! - The render composition that skins the bind pose
//! - Per-frame bone, displacement and UV-warp caches resampled from keyframes
//!
//! # Example
//!
//! ```rust,ignore
//! use creature_module::mesh_bone::{BoneCache, DisplacementFrame};
//!
//! let frame = bones_cache.sample(run_time);
//! composition.apply_bone_frame(&frame);
//! composition.deform(&bind_pts, &DisplacementFrame::new(), &mut render_pts);
//! ```

mod bone;
mod cache;
mod composition;
mod interpolation;
mod region;
mod types;

pub use bone::{BoneState, BoneTransform2D, MeshBone};
pub use cache::{
    BoneCache, BoneFrame, DisplacementCache, DisplacementFrame, TimeCache, UvWarpCache,
    UvWarpFrame,
};
pub use composition::{BoneMap, RenderComposition};
pub use interpolation::{find_timestamp_index, sample_keyframes};
pub use region::{MeshRenderRegion, UvWarp, WEIGHT_THRESHOLD};
pub use types::Lerp;
