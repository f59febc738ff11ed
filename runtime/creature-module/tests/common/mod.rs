//! Shared fixture for the integration tests
//!
//! `tests/data/hero.json` is a two-bone strip: `root` (0,0)->(1,0) carries
//! points 0 and 1, `arm` (1,0)->(2,0) carries points 2 and 3. Its clips:
//! `idle` holds the rest pose over frames 0..=10, `wave` swings the arm up
//! to (1,0)->(1,1), `slide` translates everything by +2 in y, and
//! `stretch` displaces the last point along x over frames 0..=4.

#![allow(dead_code)]

use creature_module::{Creature, CreatureManager, LoadDataPacket, SharedCreature};
use glam::Vec3;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

pub const CLIPS: [&str; 4] = ["idle", "wave", "slide", "stretch"];

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/hero.json")
}

pub fn packet() -> LoadDataPacket {
    let _ = env_logger::builder().is_test(true).try_init();
    LoadDataPacket::from_path(fixture_path()).expect("fixture should load")
}

/// Manager with every clip created and `active` playing from its start
pub fn playing(active: &str) -> (CreatureManager, SharedCreature) {
    let packet = packet();
    let creature = Rc::new(RefCell::new(Creature::new(&packet).unwrap()));
    let mut manager = CreatureManager::new(Rc::clone(&creature));
    for clip in CLIPS {
        manager.create_animation(&packet, clip).unwrap();
    }
    manager.set_active_animation_name(active, false).unwrap();
    manager.set_is_playing(true);
    (manager, creature)
}

pub fn bind_pts() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.5, 0.0, 0.0),
        Vec3::new(2.0, 0.0, 0.0),
    ]
}

/// Bind pose moved by `dy` along y
pub fn shifted_pts(dy: f32) -> Vec<Vec3> {
    bind_pts()
        .into_iter()
        .map(|p| p + Vec3::new(0.0, dy, 0.0))
        .collect()
}

pub fn assert_pts_near(actual: &[Vec3], expected: &[Vec3]) {
    assert_eq!(actual.len(), expected.len(), "point count");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            a.abs_diff_eq(*e, 1e-5),
            "point {i}: expected {e:?}, got {a:?}"
        );
    }
}
