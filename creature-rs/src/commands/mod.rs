//! Command implementations

pub mod contact;
pub mod info;
pub mod play;
pub mod tree;

use anyhow::{Context, Result};
use creature_module::{Creature, CreatureManager, LoadDataPacket};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Load a creature document, reading `.zip` archives through the zip loader
pub fn load_document(path: &Path) -> Result<LoadDataPacket> {
    let is_zip = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

    let packet = if is_zip {
        LoadDataPacket::from_zip_path(path)
    } else {
        LoadDataPacket::from_path(path)
    };
    packet.with_context(|| format!("Failed to load creature document from {}", path.display()))
}

/// Build a creature and a manager holding every clip in the document
pub fn load_manager(packet: &LoadDataPacket) -> Result<CreatureManager> {
    let creature = Creature::new(packet).context("Failed to build creature")?;
    let names = creature.animation_names().to_vec();

    let mut manager = CreatureManager::new(Rc::new(RefCell::new(creature)));
    for name in &names {
        manager
            .create_animation(packet, name)
            .with_context(|| format!("Failed to build animation '{name}'"))?;
    }
    log::debug!("Loaded {} animations", names.len());

    Ok(manager)
}
