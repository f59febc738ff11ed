//! Integration tests for point caches and bone hit-testing

mod common;

use common::{assert_pts_near, playing};
use creature_module::{CreatureError, CreatureManager};
use glam::{Mat4, Vec2, Vec3};
#[macro_use]
extern crate pretty_assertions;
use test_case::test_case;

#[test]
fn test_point_cache_covers_every_frame() {
    let (mut manager, _) = playing("wave");
    manager.set_run_time(4.0);
    manager.make_point_cache("wave").unwrap();

    let clip = manager.get_animation("wave").unwrap();
    let clip = clip.borrow();
    assert!(clip.has_cache_pts());
    assert_eq!(clip.cache_pts().len(), 11);
    assert!(clip.cache_pts().iter().all(|frame| frame.len() == 4));
    assert_eq!(manager.get_run_time(), 4.0);
}

#[test]
fn test_cached_pose_matches_skinned_pose() {
    let (mut uncached, uncached_creature) = playing("wave");
    let (mut cached, cached_creature) = playing("wave");
    cached.make_point_cache("wave").unwrap();

    for delta in [3.0, 2.0, 4.0] {
        uncached.update(delta).unwrap();
        cached.update(delta).unwrap();
        assert_eq!(
            cached_creature.borrow().render_pts(),
            uncached_creature.borrow().render_pts()
        );
    }
}

#[test]
fn test_cached_pose_interpolates_between_frames() {
    let (mut manager, creature) = playing("wave");
    manager.make_point_cache("wave").unwrap();
    manager.update(9.5).unwrap();

    let clip = manager.get_animation("wave").unwrap();
    let clip = clip.borrow();
    let expected: Vec<Vec3> = clip.cache_pts()[9]
        .iter()
        .zip(&clip.cache_pts()[10])
        .map(|(a, b)| a.lerp(*b, 0.5))
        .collect();
    assert_pts_near(creature.borrow().render_pts(), &expected);
}

#[test]
fn test_remaking_cache_replaces_it() {
    let (mut manager, _) = playing("wave");
    manager.make_point_cache("wave").unwrap();
    manager.make_point_cache("wave").unwrap();

    let clip = manager.get_animation("wave").unwrap();
    assert_eq!(clip.borrow().cache_pts().len(), 11);

    clip.borrow_mut().clear_cache_pts();
    assert!(!clip.borrow().has_cache_pts());
}

#[test]
fn test_point_cache_keeps_current_pose() {
    let (mut manager, creature) = playing("wave");
    manager.set_should_loop(false);
    manager.update(10.0).unwrap();

    let bones = creature.borrow().render_composition().bone_states();
    let uvs = creature.borrow().warped_uvs();
    let contact = |manager: &CreatureManager| {
        manager
            .is_contact_bone(Vec2::new(1.0, 0.9), &Mat4::IDENTITY, 0.2)
            .unwrap()
    };
    assert_eq!(contact(&manager).as_deref(), Some("arm"));

    manager.make_point_cache("slide").unwrap();

    assert_eq!(contact(&manager).as_deref(), Some("arm"));
    assert_eq!(creature.borrow().render_composition().bone_states(), bones);
    assert_eq!(creature.borrow().warped_uvs(), uvs);
    assert_eq!(manager.get_run_time(), 10.0);
}

#[test]
fn test_point_cache_unknown_clip() {
    let (mut manager, _) = playing("wave");
    assert!(matches!(
        manager.make_point_cache("run"),
        Err(CreatureError::NotFound(_))
    ));
}

#[test_case(Vec2::new(0.5, 0.1), 0.5 => Some("root".to_string()) ; "near root")]
#[test_case(Vec2::new(1.6, -0.2), 0.5 => Some("arm".to_string()) ; "near arm")]
#[test_case(Vec2::new(1.0, 0.0), 0.5 => Some("arm".to_string()) ; "tie goes to first name")]
#[test_case(Vec2::new(5.0, 5.0), 1.0 => None ; "too far")]
#[test_case(Vec2::new(0.5, 0.3), 0.0 => None ; "zero radius off the bone")]
fn test_contact_bone(pt: Vec2, radius: f32) -> Option<String> {
    let (manager, _) = playing("idle");
    manager
        .is_contact_bone(pt, &Mat4::IDENTITY, radius)
        .unwrap()
}

#[test]
fn test_contact_bone_uses_transform() {
    let (manager, _) = playing("idle");
    let xform = Mat4::from_translation(Vec3::new(-10.0, 0.0, 0.0));
    let hit = manager
        .is_contact_bone(Vec2::new(10.5, 0.0), &xform, 0.1)
        .unwrap();
    assert_eq!(hit.as_deref(), Some("root"));
}

#[test]
fn test_contact_bone_follows_pose() {
    let (mut manager, _) = playing("wave");
    manager.set_should_loop(false);
    manager.update(10.0).unwrap();

    let hit = manager
        .is_contact_bone(Vec2::new(1.0, 0.9), &Mat4::IDENTITY, 0.2)
        .unwrap();
    assert_eq!(hit.as_deref(), Some("arm"));
}

#[test]
fn test_contact_bone_without_creature() {
    let manager = CreatureManager::empty();
    assert!(matches!(
        manager.is_contact_bone(Vec2::ZERO, &Mat4::IDENTITY, 1.0),
        Err(CreatureError::Uninitialized(_))
    ));
}

#[test]
fn test_contact_bone_mirrored() {
    let (mut manager, _) = playing("wave");
    manager.set_should_loop(false);
    manager.set_mirror_y(true);
    manager.update(10.0).unwrap();

    let hit = manager
        .is_contact_bone(Vec2::new(1.0, -0.9), &Mat4::IDENTITY, 0.2)
        .unwrap();
    assert_eq!(hit.as_deref(), Some("arm"));

    let unmirrored = manager
        .is_contact_bone(Vec2::new(1.0, 0.9), &Mat4::IDENTITY, 0.2)
        .unwrap();
    assert_eq!(unmirrored, None);
}
