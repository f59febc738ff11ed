//! Runtime for 2D skeletal mesh creatures
//!
//! A creature document (JSON, optionally zipped) describes a textured mesh,
//! a bone hierarchy that skins it, and named animation clips. This crate
//! loads the document, turns clips into dense per-frame caches, and plays
//! them back through a [`CreatureManager`] that supports looping, custom
//! frame ranges, two-clip blending with a timed ramp, point caching, Y
//! mirroring, bone hit-testing and a per-update bone override hook.
//!
//! # Example
//!
//! ```no_run
//! use creature_module::{Creature, CreatureManager, LoadDataPacket};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let packet = LoadDataPacket::from_path("hero.json")?;
//! let creature = Rc::new(RefCell::new(Creature::new(&packet)?));
//!
//! let mut manager = CreatureManager::new(Rc::clone(&creature));
//! manager.create_animation(&packet, "walk")?;
//! manager.set_active_animation_name("walk", false)?;
//! manager.set_is_playing(true);
//! manager.update(1.0)?;
//!
//! println!("{:?}", creature.borrow().render_pts());
//! # Ok::<(), creature_module::CreatureError>(())
//! ```

pub mod animation;
pub mod creature;
pub mod error;
pub mod load;
pub mod manager;
pub mod mesh_bone;
pub mod settings;

pub use animation::{CreatureAnimation, MAX_CLIP_FRAMES};
pub use creature::Creature;
pub use error::{CreatureError, Result};
pub use load::LoadDataPacket;
pub use manager::{BonesOverrideCallback, CreatureManager, SharedAnimation, SharedCreature};
pub use settings::{BlendRamp, BlendSettings, PlaybackSettings, TimeRange};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
