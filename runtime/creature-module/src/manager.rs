//! Playback state machine driving a creature with its animation clips

use crate::animation::CreatureAnimation;
use crate::creature::Creature;
use crate::error::{CreatureError, Result};
use crate::load::LoadDataPacket;
use crate::mesh_bone::{BoneMap, MeshBone};
use crate::settings::PlaybackSettings;
use glam::{Mat4, Vec2, Vec3};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A creature shared between managers
pub type SharedCreature = Rc<RefCell<Creature>>;
/// A clip shared between managers
pub type SharedAnimation = Rc<RefCell<CreatureAnimation>>;
/// Hook that may edit posed bones once per update
pub type BonesOverrideCallback = Box<dyn FnMut(&mut BoneMap)>;

/// Plays, loops, blends and caches animation clips for one target creature
///
/// A manager owns its playback state only. The creature and the clips are
/// shared handles; each `update` writes the target creature's render points.
pub struct CreatureManager {
    animations: HashMap<String, SharedAnimation>,
    target_creature: Option<SharedCreature>,
    active_animation_name: Option<String>,
    is_playing: bool,
    run_time: f32,
    time_scale: f32,
    blend_render_pts: [Vec<Vec3>; 2],
    do_blending: bool,
    blending_factor: f32,
    blending_factor_source: f32,
    blending_factor_target: f32,
    blending_factor_transition_time: f32,
    use_blending_over_time: bool,
    blending_accumulated_time: f32,
    active_blend_animation_names: [Option<String>; 2],
    mirror_y: bool,
    use_custom_time_range: bool,
    custom_start_time: i32,
    custom_end_time: i32,
    should_loop: bool,
    bones_override_callback: Option<BonesOverrideCallback>,
}

impl CreatureManager {
    /// Manager driving `creature`
    pub fn new(creature: SharedCreature) -> Self {
        let mut manager = Self::empty();
        manager.set_target_creature(creature);
        manager
    }

    /// Manager with no target creature yet
    pub fn empty() -> Self {
        Self {
            animations: HashMap::new(),
            target_creature: None,
            active_animation_name: None,
            is_playing: false,
            run_time: 0.0,
            time_scale: 1.0,
            blend_render_pts: [Vec::new(), Vec::new()],
            do_blending: false,
            blending_factor: 0.0,
            blending_factor_source: 0.0,
            blending_factor_target: 0.0,
            blending_factor_transition_time: 0.0,
            use_blending_over_time: false,
            blending_accumulated_time: 0.0,
            active_blend_animation_names: [None, None],
            mirror_y: false,
            use_custom_time_range: false,
            custom_start_time: 0,
            custom_end_time: 0,
            should_loop: true,
            bones_override_callback: None,
        }
    }

    /// Replace the creature this manager writes into
    pub fn set_target_creature(&mut self, creature: SharedCreature) {
        let num_pts = creature.borrow().total_num_pts();
        for pts in &mut self.blend_render_pts {
            pts.clear();
            pts.resize(num_pts, Vec3::ZERO);
        }
        self.target_creature = Some(creature);
    }

    /// Build the clip `name` from `load_data` and register it
    pub fn create_animation(&mut self, load_data: &LoadDataPacket, name: &str) -> Result<()> {
        let animation = CreatureAnimation::new(load_data, name)?;
        self.add_animation(Rc::new(RefCell::new(animation)));
        Ok(())
    }

    /// Register an already built clip, replacing any clip of the same name
    pub fn add_animation(&mut self, animation: SharedAnimation) {
        let name = animation.borrow().name().to_string();
        self.animations.insert(name, animation);
    }

    pub fn get_animation(&self, name: &str) -> Option<SharedAnimation> {
        self.animations.get(name).cloned()
    }

    pub fn get_creature(&self) -> Option<SharedCreature> {
        self.target_creature.clone()
    }

    pub fn get_all_animations(&self) -> &HashMap<String, SharedAnimation> {
        &self.animations
    }

    fn animation(&self, name: &str) -> Result<&SharedAnimation> {
        self.animations.get(name).ok_or_else(|| {
            log::warn!("Unknown animation '{}'", name);
            CreatureError::NotFound(name.to_string())
        })
    }

    fn creature(&self) -> Result<&SharedCreature> {
        self.target_creature.as_ref().ok_or_else(|| {
            log::warn!("No target creature set");
            CreatureError::Uninitialized("target creature")
        })
    }

    fn active_animation(&self) -> Result<&SharedAnimation> {
        let name = self
            .active_animation_name
            .as_deref()
            .ok_or(CreatureError::Uninitialized("active animation"))?;
        self.animation(name)
    }

    /// Make `name` the playing clip and rewind to its start
    ///
    /// With `check_already_active` set, re-selecting the active clip keeps
    /// the current run time.
    pub fn set_active_animation_name(
        &mut self,
        name: &str,
        check_already_active: bool,
    ) -> Result<()> {
        let start_time = self.animation(name)?.borrow().start_time();
        if check_already_active && self.active_animation_name.as_deref() == Some(name) {
            return Ok(());
        }

        self.active_animation_name = Some(name.to_string());
        self.run_time = if self.use_custom_time_range {
            self.custom_start_time as f32
        } else {
            start_time
        };
        if !self.do_blending {
            self.blending_accumulated_time = 0.0;
        }
        log::debug!("Active animation: '{}' at {}", name, self.run_time);
        Ok(())
    }

    pub fn get_active_animation_name(&self) -> Option<&str> {
        self.active_animation_name.as_deref()
    }

    pub fn get_is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn set_is_playing(&mut self, is_playing: bool) {
        self.is_playing = is_playing;
    }

    /// Rewind to the start of the effective time range
    pub fn reset_to_start_times(&mut self) -> Result<()> {
        let (start, _) = self.time_bounds()?;
        self.run_time = start;
        Ok(())
    }

    pub fn set_run_time(&mut self, run_time: f32) {
        self.run_time = run_time;
    }

    /// Advance run time by `delta`, wrapping or clamping into the time range
    pub fn incre_run_time(&mut self, delta: f32) -> Result<()> {
        let (start, end) = self.time_bounds()?;
        self.run_time = self.resolve_run_time(self.run_time + delta, start, end);
        Ok(())
    }

    pub fn get_run_time(&self) -> f32 {
        self.run_time
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// The custom range when enabled, else the active clip's range
    fn time_bounds(&self) -> Result<(f32, f32)> {
        if self.use_custom_time_range {
            if self.custom_start_time >= self.custom_end_time {
                log::warn!(
                    "Custom time range {}..{} is empty",
                    self.custom_start_time,
                    self.custom_end_time
                );
                return Err(CreatureError::InvalidRange {
                    start: self.custom_start_time,
                    end: self.custom_end_time,
                });
            }
            return Ok((self.custom_start_time as f32, self.custom_end_time as f32));
        }

        let animation = self.active_animation()?.borrow();
        Ok((animation.start_time(), animation.end_time()))
    }

    fn resolve_run_time(&self, time: f32, start: f32, end: f32) -> f32 {
        if !self.should_loop {
            return time.clamp(start, end);
        }

        let length = end - start;
        if length <= 0.0 {
            return start;
        }
        if time >= end || time < start {
            // rem_euclid can round a tiny negative remainder up to `length`
            let wrapped = start + (time - start).rem_euclid(length);
            if wrapped >= end { start } else { wrapped }
        } else {
            time
        }
    }

    fn blend_sources(&self) -> Result<[SharedAnimation; 2]> {
        let [first, second] = &self.active_blend_animation_names;
        let (Some(first), Some(second)) = (first.as_deref(), second.as_deref()) else {
            return Err(CreatureError::Uninitialized("blend animations"));
        };
        Ok([
            Rc::clone(self.animation(first)?),
            Rc::clone(self.animation(second)?),
        ])
    }

    fn advance_blend_ramp(&mut self, delta: f32) {
        let source = self.blending_factor_source;
        let target = self.blending_factor_target;
        let transition = self.blending_factor_transition_time;

        if transition <= 0.0 {
            self.blending_accumulated_time = 0.0;
            self.blending_factor = target;
            return;
        }

        self.blending_accumulated_time = (self.blending_accumulated_time + delta).min(transition);
        let ratio = self.blending_accumulated_time / transition;
        let factor = source + (target - source) * ratio;
        self.blending_factor = factor.clamp(source.min(target), source.max(target));
    }

    /// Advance playback by `delta` and write the posed render points
    ///
    /// Does nothing while stopped. Every precondition is checked before the
    /// run time, the blend ramp or the creature is touched.
    pub fn update(&mut self, delta: f32) -> Result<()> {
        if !self.is_playing {
            return Ok(());
        }

        let creature = Rc::clone(self.creature()?);
        let (start, end) = self.time_bounds()?;
        let active = Rc::clone(self.active_animation()?);
        let sources = if self.do_blending {
            Some(self.blend_sources()?)
        } else {
            None
        };

        let effective_delta = delta * self.time_scale;
        self.run_time = self.resolve_run_time(self.run_time + effective_delta, start, end);
        if self.use_blending_over_time {
            self.advance_blend_ramp(effective_delta.abs());
        }
        log::trace!(
            "Update: run_time={} blend={} factor={}",
            self.run_time,
            self.do_blending,
            self.blending_factor
        );

        let run_time = self.run_time;
        let mut creature = creature.borrow_mut();
        match sources {
            Some([first, second]) => {
                pose_into(&mut creature, &first.borrow(), run_time, &mut self.blend_render_pts[0]);
                let first_bones = creature.render_composition().bone_states();
                pose_into(&mut creature, &second.borrow(), run_time, &mut self.blend_render_pts[1]);

                let factor = self.blending_factor;
                creature
                    .render_composition_mut()
                    .blend_bones_from(&first_bones, factor);
                let [first_pts, second_pts] = &self.blend_render_pts;
                for ((out, a), b) in creature
                    .render_pts_mut()
                    .iter_mut()
                    .zip(first_pts)
                    .zip(second_pts)
                {
                    *out = *a * (1.0 - factor) + *b * factor;
                }
            }
            None => {
                let target = &mut self.blend_render_pts[0];
                pose_into(&mut creature, &active.borrow(), run_time, target);
                creature.render_pts_mut().copy_from_slice(target.as_slice());
            }
        }

        if let Some(callback) = self.bones_override_callback.as_mut() {
            let before = creature.render_composition().bone_states();
            callback(creature.render_composition_mut().bones_mut());
            if creature.render_composition().bone_states() != before {
                creature.apply_bone_override_delta(&before);
            }
        }

        if self.mirror_y {
            for pt in creature.render_pts_mut() {
                pt.y = -pt.y;
            }
        }

        Ok(())
    }

    /// Pose clip `name` at the current run time into `target`
    ///
    /// `target` is resized to the creature's point count. The clip's point
    /// cache is used when one exists.
    pub fn pose_creature(&self, name: &str, target: &mut Vec<Vec3>) -> Result<()> {
        let animation = self.animation(name)?;
        let creature = self.creature()?;
        pose_into(
            &mut creature.borrow_mut(),
            &animation.borrow(),
            self.run_time,
            target,
        );
        Ok(())
    }

    /// Name of the bone nearest to `pt`, if one lies within `radius`
    ///
    /// `creature_xform` maps `pt` into the creature's local space. With
    /// mirroring on, `pt` is tested against the mirrored mesh as drawn. Bones
    /// at exactly the same distance resolve to the first in name order.
    pub fn is_contact_bone(
        &self,
        pt: Vec2,
        creature_xform: &Mat4,
        radius: f32,
    ) -> Result<Option<String>> {
        let creature = self.creature()?.borrow();
        let mut local = creature_xform.transform_point3(pt.extend(0.0)).truncate();
        if self.mirror_y {
            local.y = -local.y;
        }

        let mut nearest: Option<(&MeshBone, f32)> = None;
        for bone in creature.render_composition().bones().values() {
            let distance = bone.distance_to(local);
            if distance > radius {
                continue;
            }
            if nearest.is_none_or(|(_, best)| distance < best) {
                nearest = Some((bone, distance));
            }
        }

        Ok(nearest.map(|(bone, _)| bone.name().to_string()))
    }

    /// Precompute deformed points for every frame of clip `name`
    ///
    /// Replaces any existing point cache. The run time and the creature's
    /// posed bones and UV warps are left as they were.
    pub fn make_point_cache(&mut self, name: &str) -> Result<()> {
        let animation = Rc::clone(self.animation(name)?);
        let creature = Rc::clone(self.creature()?);

        animation.borrow_mut().clear_cache_pts();
        let frames = {
            let clip = animation.borrow();
            let mut creature = creature.borrow_mut();
            let bones = creature.render_composition().bone_states();
            let uv_warps = creature.render_composition().uv_warps();

            let start = clip.start_time() as i32;
            let end = clip.end_time() as i32;
            let frames = (start..=end)
                .map(|frame| {
                    let mut pts = Vec::new();
                    pose_into(&mut creature, &clip, frame as f32, &mut pts);
                    pts
                })
                .collect::<Vec<_>>();

            let composition = creature.render_composition_mut();
            composition.apply_bone_frame(&bones);
            composition.apply_uv_warp_frame(&uv_warps);
            frames
        };

        log::debug!("Built point cache for '{}': {} frames", name, frames.len());
        animation.borrow_mut().set_cache_pts(frames);
        Ok(())
    }

    pub fn set_blending(&mut self, do_blending: bool) {
        self.do_blending = do_blending;
    }

    pub fn is_blending(&self) -> bool {
        self.do_blending
    }

    /// Choose the two clips mixed while blending
    pub fn set_blending_animations(&mut self, first: &str, second: &str) -> Result<()> {
        self.animation(first)?;
        self.animation(second)?;
        self.active_blend_animation_names = [Some(first.to_string()), Some(second.to_string())];
        Ok(())
    }

    pub fn blending_animations(&self) -> [Option<&str>; 2] {
        let [first, second] = &self.active_blend_animation_names;
        [first.as_deref(), second.as_deref()]
    }

    /// Weight of the second blend source, clamped to `[0, 1]`
    pub fn set_blending_factor(&mut self, factor: f32) {
        self.blending_factor = factor.clamp(0.0, 1.0);
    }

    pub fn get_blending_factor(&self) -> f32 {
        self.blending_factor
    }

    /// Endpoints of the blend ramp; restarts the ramp
    pub fn set_blending_factor_range(&mut self, source: f32, target: f32) {
        self.blending_factor_source = source.clamp(0.0, 1.0);
        self.blending_factor_target = target.clamp(0.0, 1.0);
        self.blending_accumulated_time = 0.0;
        if self.use_blending_over_time {
            self.blending_factor = self.blending_factor_source;
        }
    }

    /// Time taken by the ramp to go from source to target
    pub fn set_blending_factor_time(&mut self, transition_time: f32) {
        self.blending_factor_transition_time = transition_time.max(0.0);
    }

    /// Drive the blend factor from the ramp on each update
    pub fn set_use_blending_factor_timing(&mut self, use_timing: bool) {
        self.use_blending_over_time = use_timing;
        self.blending_accumulated_time = 0.0;
        if use_timing {
            self.blending_factor = self.blending_factor_source;
        }
    }

    pub fn set_mirror_y(&mut self, mirror_y: bool) {
        self.mirror_y = mirror_y;
    }

    pub fn mirror_y(&self) -> bool {
        self.mirror_y
    }

    pub fn set_use_custom_time_range(&mut self, use_custom: bool) {
        self.use_custom_time_range = use_custom;
    }

    pub fn use_custom_time_range(&self) -> bool {
        self.use_custom_time_range
    }

    /// Restrict playback to frames `start..=end`
    pub fn set_custom_time_range(&mut self, start: i32, end: i32) -> Result<()> {
        if start >= end {
            log::warn!("Rejected custom time range {}..{}", start, end);
            return Err(CreatureError::InvalidRange { start, end });
        }
        self.custom_start_time = start;
        self.custom_end_time = end;
        Ok(())
    }

    pub fn custom_time_range(&self) -> (i32, i32) {
        (self.custom_start_time, self.custom_end_time)
    }

    pub fn set_should_loop(&mut self, should_loop: bool) {
        self.should_loop = should_loop;
    }

    pub fn should_loop(&self) -> bool {
        self.should_loop
    }

    /// Install a hook that may edit the posed bones on every update
    pub fn set_bones_override_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&mut BoneMap) + 'static,
    {
        self.bones_override_callback = Some(Box::new(callback));
    }

    pub fn clear_bones_override_callback(&mut self) {
        self.bones_override_callback = None;
    }

    /// Validate and apply a whole playback configuration
    ///
    /// Nothing is changed when any part of `settings` is rejected.
    pub fn apply_settings(&mut self, settings: &PlaybackSettings) -> Result<()> {
        if let Some(name) = &settings.animation {
            self.animation(name)?;
        }
        if let Some(range) = settings.custom_time_range {
            if range.start >= range.end {
                return Err(CreatureError::InvalidRange {
                    start: range.start,
                    end: range.end,
                });
            }
        }
        if let Some(blending) = &settings.blending {
            for name in &blending.animations {
                self.animation(name)?;
            }
        }

        self.time_scale = settings.time_scale;
        self.should_loop = settings.should_loop;
        self.mirror_y = settings.mirror_y;

        match settings.custom_time_range {
            Some(range) => {
                self.custom_start_time = range.start;
                self.custom_end_time = range.end;
                self.use_custom_time_range = true;
            }
            None => self.use_custom_time_range = false,
        }

        match &settings.blending {
            Some(blending) => {
                let [first, second] = &blending.animations;
                self.active_blend_animation_names = [Some(first.clone()), Some(second.clone())];
                self.do_blending = true;
                self.set_blending_factor(blending.factor);
                match blending.ramp {
                    Some(ramp) => {
                        self.set_blending_factor_time(ramp.transition_time);
                        self.use_blending_over_time = true;
                        self.set_blending_factor_range(ramp.source, ramp.target);
                    }
                    None => self.use_blending_over_time = false,
                }
            }
            None => {
                self.do_blending = false;
                self.use_blending_over_time = false;
            }
        }

        if let Some(name) = &settings.animation {
            self.set_active_animation_name(name, false)?;
        }
        self.is_playing = settings.is_playing;
        Ok(())
    }
}

impl Default for CreatureManager {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for CreatureManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatureManager")
            .field("animations", &self.animations.keys().collect::<Vec<_>>())
            .field("has_target_creature", &self.target_creature.is_some())
            .field("active_animation_name", &self.active_animation_name)
            .field("is_playing", &self.is_playing)
            .field("run_time", &self.run_time)
            .field("time_scale", &self.time_scale)
            .field("do_blending", &self.do_blending)
            .field("blending_factor", &self.blending_factor)
            .field("mirror_y", &self.mirror_y)
            .field("should_loop", &self.should_loop)
            .field(
                "has_bones_override_callback",
                &self.bones_override_callback.is_some(),
            )
            .finish_non_exhaustive()
    }
}

/// Pose `animation` at `time` and write the skinned points into `target`
fn pose_into(
    creature: &mut Creature,
    animation: &CreatureAnimation,
    time: f32,
    target: &mut Vec<Vec3>,
) {
    let num_pts = creature.total_num_pts();
    target.resize(num_pts, Vec3::ZERO);
    creature.pose_bones(animation, time);
    if !(animation.has_cache_pts() && animation.pose_from_cache_pts(time, target, num_pts)) {
        creature.deform(animation, time, target);
    }
}
