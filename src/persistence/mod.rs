//! Save/restore of the entity collection
//!
//! Features:
//! - Versioned JSON envelope
//! - Backup rotation (tmp → save, old save → backup)
//! - Unknown shape records skipped on restore

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::monitor::unix_millis;
use crate::sim::{Color, Entity, EntityFactory, EntityId, Rect, ShapeKind, boundary};

pub const FORMAT_VERSION: &str = "1.0";

fn default_aspect() -> f64 {
    1.0
}

/// One serialized entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Shape token, kept as a string so unknown kinds survive parsing
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub size: f64,
    #[serde(default = "default_aspect")]
    pub aspect: f64,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub colliding: bool,
}

impl EntityRecord {
    pub fn from_entity(e: &Entity) -> Self {
        let color = e.base_color();
        Self {
            kind: e.kind().as_str().to_string(),
            x: e.pos.x,
            y: e.pos.y,
            dx: e.vel.x,
            dy: e.vel.y,
            size: e.size(),
            aspect: e.aspect(),
            red: color.r,
            green: color.g,
            blue: color.b,
            paused: e.is_paused(),
            colliding: e.is_colliding(),
        }
    }

    /// Rebuild the entity through centered placement, then reapply the saved
    /// state, keeping it inside `canvas`. Returns `None` for an unrecognized
    /// shape type.
    pub fn to_entity(
        &self,
        id: EntityId,
        factory: &mut EntityFactory,
        canvas: DVec2,
        now: Instant,
    ) -> Option<Entity> {
        let Some(kind) = ShapeKind::from_str(&self.kind) else {
            log::warn!("Skipping saved object with unknown type {:?}", self.kind);
            return None;
        };

        let pos = DVec2::new(self.x, self.y);
        let center = pos + DVec2::splat(self.size * 0.5);
        let mut entity = factory
            .centered(id, kind, center, canvas.x, canvas.y)
            .with_size(self.size)
            .with_aspect(self.aspect);

        // Saved on a larger canvas: pull back inside
        entity.pos = pos;
        boundary::contain(&mut entity, &Rect::new(DVec2::ZERO, canvas));
        entity.vel = DVec2::new(self.dx, self.dy);
        entity.set_base_color(Color::new(self.red, self.green, self.blue));
        entity.set_paused(self.paused);
        if self.colliding {
            entity.mark_colliding(now);
        }
        Some(entity)
    }
}

/// Versioned save document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: String,
    pub saved_at_ms: u64,
    pub object_count: usize,
    pub objects: Vec<EntityRecord>,
}

impl SaveFile {
    pub fn new(entities: &[Entity]) -> Self {
        let objects: Vec<EntityRecord> = entities.iter().map(EntityRecord::from_entity).collect();
        Self {
            version: FORMAT_VERSION.to_string(),
            saved_at_ms: unix_millis(SystemTime::now()),
            object_count: objects.len(),
            objects,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: SaveFile = serde_json::from_str(text)?;
        if file.version != FORMAT_VERSION {
            log::warn!(
                "Save file version {} differs from {}, loading anyway",
                file.version,
                FORMAT_VERSION
            );
        }
        if file.object_count != file.objects.len() {
            log::warn!(
                "Save file claims {} objects but holds {}",
                file.object_count,
                file.objects.len()
            );
        }
        Ok(file)
    }
}

/// `<name>.bak` next to `path`
pub fn backup_path(path: &Path) -> PathBuf {
    sibling(path, "bak")
}

fn sibling(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(ext);
    path.with_file_name(name)
}

/// Write `entities` to `path`, keeping the previous file as a backup
pub fn save(path: impl AsRef<Path>, entities: &[Entity]) -> Result<usize> {
    let path = path.as_ref();
    let json = SaveFile::new(entities).to_json()?;

    let tmp = sibling(path, "tmp");
    fs::write(&tmp, json).map_err(|e| Error::io(&tmp, e))?;

    if path.exists() {
        let bak = backup_path(path);
        fs::rename(path, &bak).map_err(|e| Error::io(&bak, e))?;
    }
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;

    log::info!("Saved {} objects to {}", entities.len(), path.display());
    Ok(entities.len())
}

/// Read a save document from `path`
pub fn load(path: impl AsRef<Path>) -> Result<SaveFile> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let file = SaveFile::from_json(&text)?;
    log::info!("Loaded {} objects from {}", file.objects.len(), path.display());
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Entity> {
        let mut factory = EntityFactory::new(11);
        let mut rect = factory.random(EntityId(1), ShapeKind::Rectangle, 400.0, 300.0);
        rect.set_paused(true);
        let mut tri = factory.random(EntityId(2), ShapeKind::Triangle, 400.0, 300.0);
        tri.mark_colliding(Instant::now());
        vec![rect, tri]
    }

    #[test]
    fn test_save_and_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shapes.json");
        let entities = sample();

        assert_eq!(save(&path, &entities).unwrap(), 2);
        let file = load(&path).unwrap();
        assert_eq!(file.version, FORMAT_VERSION);
        assert_eq!(file.object_count, 2);

        let mut factory = EntityFactory::new(0);
        let now = Instant::now();
        let restored: Vec<Entity> = file
            .objects
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.to_entity(EntityId(i as u64 + 10), &mut factory, DVec2::new(400.0, 300.0), now))
            .collect();

        assert_eq!(restored.len(), 2);
        for (orig, back) in entities.iter().zip(&restored) {
            assert_eq!(orig.kind(), back.kind());
            assert_eq!(orig.pos, back.pos);
            assert_eq!(orig.vel, back.vel);
            assert_eq!(orig.size(), back.size());
            assert_eq!(orig.aspect(), back.aspect());
            assert_eq!(orig.base_color(), back.base_color());
            assert_eq!(orig.is_paused(), back.is_paused());
            assert_eq!(orig.is_colliding(), back.is_colliding());
        }
    }

    #[test]
    fn test_second_save_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shapes.json");
        let entities = sample();

        save(&path, &entities[..1]).unwrap();
        save(&path, &entities).unwrap();

        let backup = load(backup_path(&path)).unwrap();
        assert_eq!(backup.objects.len(), 1);
        assert_eq!(load(&path).unwrap().objects.len(), 2);
        assert!(!sibling(&path, "tmp").exists());
    }

    #[test]
    fn test_unknown_type_skipped() {
        let json = r#"{
            "version": "1.0", "saved_at_ms": 0, "object_count": 2,
            "objects": [
                { "type": "hexagon", "x": 1, "y": 2, "dx": 0.5, "dy": 0.5, "size": 12,
                  "red": 1, "green": 2, "blue": 3 },
                { "type": "circle", "x": 10, "y": 20, "dx": 0.5, "dy": -0.5, "size": 12,
                  "red": 1, "green": 2, "blue": 3 }
            ]
        }"#;
        let file = SaveFile::from_json(json).unwrap();
        assert_eq!(file.objects[1].aspect, 1.0);
        assert!(!file.objects[1].paused);

        let mut factory = EntityFactory::new(0);
        let canvas = DVec2::new(100.0, 100.0);
        let now = Instant::now();
        assert!(file.objects[0].to_entity(EntityId(1), &mut factory, canvas, now).is_none());
        let circle = file.objects[1].to_entity(EntityId(2), &mut factory, canvas, now).unwrap();
        assert_eq!(circle.pos, DVec2::new(10.0, 20.0));
    }

    #[test]
    fn test_paused_restored_inside_smaller_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.json");

        let mut rect = Entity::new(
            EntityId(1),
            ShapeKind::Rectangle,
            DVec2::new(950.0, 700.0),
            DVec2::new(0.5, -0.5),
            20.0,
            Color::new(10, 20, 30),
        )
        .with_aspect(0.9);
        rect.set_paused(true);
        save(&path, &[rect]).unwrap();

        let file = load(&path).unwrap();
        let mut factory = EntityFactory::new(3);
        let back = file.objects[0]
            .to_entity(EntityId(1), &mut factory, DVec2::new(400.0, 300.0), Instant::now())
            .unwrap();

        assert!(back.is_paused());
        assert_eq!(back.vel, DVec2::new(0.5, -0.5));
        let b = back.bounds();
        assert!(b.min.x >= 0.0 && b.min.y >= 0.0);
        assert!((b.max.x - 400.0).abs() < 1e-9);
        assert!((b.max.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_floats_reload_bit_exact() {
        let mut factory = EntityFactory::new(9);
        let mut e = factory.random(EntityId(1), ShapeKind::Circle, 400.0, 300.0);
        e.pos = DVec2::new(22.847944625804057, 127.43204903023799);
        e.vel = DVec2::new(0.1 + 0.2, -1.0 / 3.0);

        let json = SaveFile::new(&[e.clone()]).to_json().unwrap();
        let record = &SaveFile::from_json(&json).unwrap().objects[0];
        assert_eq!(record.x.to_bits(), e.pos.x.to_bits());
        assert_eq!(record.y.to_bits(), e.pos.y.to_bits());
        assert_eq!(record.dx.to_bits(), e.vel.x.to_bits());
        assert_eq!(record.dy.to_bits(), e.vel.y.to_bits());
        assert_eq!(record.size.to_bits(), e.size().to_bits());
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(SaveFile::from_json("{ not json"), Err(Error::Json(_))));
    }
}
