//! Entity state: kinematics, geometry and display flags
//!
//! Position is the top-left corner of the entity's bounding box. The concrete
//! shape is rebuilt from position + size on every query, so geometry is never
//! stale after a move.

use std::fmt;
use std::time::Instant;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::boundary;
use super::geometry::{Rect, Shape};
use super::trajectory::Trajectory;
use crate::consts::*;

/// Stable identity of an entity for the lifetime of the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Circle,
    Rectangle,
    Triangle,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Circle, ShapeKind::Rectangle, ShapeKind::Triangle];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Triangle => "triangle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "circle" | "ball" => Some(ShapeKind::Circle),
            "rectangle" | "rect" => Some(ShapeKind::Rectangle),
            "triangle" | "tri" => Some(ShapeKind::Triangle),
            _ => None,
        }
    }

    /// Lenient parse used by spawn requests: unknown tokens fall back to a circle
    pub fn from_token(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            log::debug!("Unknown shape token {s:?}, spawning a circle");
            ShapeKind::Circle
        })
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel complement, shown while colliding
    pub fn inverted(self) -> Self {
        Self::new(255 - self.r, 255 - self.g, 255 - self.b)
    }

    /// Lighter variant shown while hovered (channels scaled by 1/0.7)
    pub fn brighter(self) -> Self {
        const FACTOR: f64 = 0.7;
        // Smallest non-zero channel value that still grows when scaled
        let floor = (1.0 / (1.0 - FACTOR)) as u8;

        if self.r == 0 && self.g == 0 && self.b == 0 {
            return Self::new(floor, floor, floor);
        }
        let lift = |c: u8| {
            let c = if c > 0 && c < floor { floor } else { c };
            (c as f64 / FACTOR).min(255.0) as u8
        };
        Self::new(lift(self.r), lift(self.g), lift(self.b))
    }
}

/// Border style hint for renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outline {
    Thin,
    Heavy,
    Dashed,
}

/// A movable shape
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    kind: ShapeKind,
    /// Top-left corner of the bounding box
    pub pos: DVec2,
    /// Displacement per animation step
    pub vel: DVec2,
    size: f64,
    /// Height / width; only rectangles deviate from 1.0
    aspect: f64,
    color: Color,
    paused: bool,
    hovered: bool,
    /// Set while the collision color is showing
    collision_started: Option<Instant>,
}

impl Entity {
    pub fn new(id: EntityId, kind: ShapeKind, pos: DVec2, vel: DVec2, size: f64, color: Color) -> Self {
        let size = if size > 0.0 && size.is_finite() { size } else { MIN_SIZE };
        Self {
            id,
            kind,
            pos,
            vel,
            size,
            aspect: 1.0,
            color,
            paused: false,
            hovered: false,
            collision_started: None,
        }
    }

    /// Set the rectangle height ratio (ignored for other kinds)
    pub fn with_aspect(mut self, aspect: f64) -> Self {
        if self.kind == ShapeKind::Rectangle && aspect > 0.0 && aspect.is_finite() {
            self.aspect = aspect;
        }
        self
    }

    /// Replace the size, keeping the current one if `size` is not positive
    pub fn with_size(mut self, size: f64) -> Self {
        if size > 0.0 && size.is_finite() {
            self.size = size;
        }
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// Width and height of the bounding box
    pub fn extent(&self) -> DVec2 {
        DVec2::new(self.size, self.size * self.aspect)
    }

    /// Current geometry
    pub fn shape(&self) -> Shape {
        let ext = self.extent();
        match self.kind {
            ShapeKind::Circle => Shape::Circle {
                center: self.pos + ext * 0.5,
                radius: self.size * 0.5,
            },
            ShapeKind::Rectangle => Shape::Rect(Rect::from_origin_size(self.pos, ext)),
            ShapeKind::Triangle => Shape::Triangle([
                DVec2::new(self.pos.x + ext.x * 0.5, self.pos.y),
                self.pos + ext,
                DVec2::new(self.pos.x, self.pos.y + ext.y),
            ]),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.pos, self.extent())
    }

    pub fn center(&self) -> DVec2 {
        self.pos + self.extent() * 0.5
    }

    /// Move so the bounding box is centered on `center`
    pub fn set_center(&mut self, center: DVec2) {
        self.pos = center - self.extent() * 0.5;
    }

    pub fn contains(&self, point: DVec2) -> bool {
        self.shape().contains(point)
    }

    pub fn base_color(&self) -> Color {
        self.color
    }

    pub fn set_base_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Color to paint: inverted while colliding, lighter while hovered
    pub fn display_color(&self) -> Color {
        if self.is_colliding() {
            self.color.inverted()
        } else if self.hovered {
            self.color.brighter()
        } else {
            self.color
        }
    }

    pub fn outline(&self) -> Outline {
        if self.paused {
            Outline::Dashed
        } else if self.is_colliding() {
            Outline::Heavy
        } else {
            Outline::Thin
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Flip the paused flag, returning the new value
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub fn is_colliding(&self) -> bool {
        self.collision_started.is_some()
    }

    pub fn collision_started(&self) -> Option<Instant> {
        self.collision_started
    }

    /// Enter (or refresh) the colliding state
    pub fn mark_colliding(&mut self, now: Instant) {
        self.collision_started = Some(now);
    }

    pub fn clear_colliding(&mut self) {
        self.collision_started = None;
    }

    /// Drop the colliding state once the display duration has elapsed.
    /// Returns true if the flag was cleared by this call.
    pub fn refresh_collision_display(&mut self, now: Instant) -> bool {
        match self.collision_started {
            Some(start) if now.saturating_duration_since(start) > COLLISION_DISPLAY_DURATION => {
                self.collision_started = None;
                true
            }
            _ => false,
        }
    }

    /// One animation step: trajectory, wall reflection, collision display decay.
    /// Paused entities keep their velocity and are only pulled back inside a
    /// canvas that shrank under them.
    pub fn advance(&mut self, trajectory: Trajectory, canvas: &Rect, now: Instant) {
        if self.paused {
            boundary::contain(self, canvas);
        } else {
            trajectory.apply(self);
            boundary::reflect(self, canvas);
        }
        self.refresh_collision_display(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn circle_at(center: DVec2, radius: f64) -> Entity {
        let mut e = Entity::new(
            EntityId(1),
            ShapeKind::Circle,
            DVec2::ZERO,
            DVec2::new(1.0, 1.0),
            radius * 2.0,
            Color::new(10, 100, 200),
        );
        e.set_center(center);
        e
    }

    #[test]
    fn test_shape_kind_tokens() {
        assert_eq!(ShapeKind::from_str("Rectangle"), Some(ShapeKind::Rectangle));
        assert_eq!(ShapeKind::from_str("hexagon"), None);
        assert_eq!(ShapeKind::from_token("hexagon"), ShapeKind::Circle);
        assert_eq!(ShapeKind::from_token("triangle"), ShapeKind::Triangle);
    }

    #[test]
    fn test_collision_display_decay() {
        let mut e = circle_at(DVec2::new(50.0, 50.0), 10.0);
        let t = Instant::now();
        e.mark_colliding(t);

        e.refresh_collision_display(t + Duration::from_millis(100));
        assert!(e.is_colliding());

        e.refresh_collision_display(t + Duration::from_millis(250));
        assert!(!e.is_colliding());
        assert_eq!(e.display_color(), e.base_color());
    }

    #[test]
    fn test_retrigger_refreshes_timestamp() {
        let mut e = circle_at(DVec2::new(50.0, 50.0), 10.0);
        let t = Instant::now();
        e.mark_colliding(t);
        e.mark_colliding(t + Duration::from_millis(150));

        assert!(!e.refresh_collision_display(t + Duration::from_millis(250)));
        assert!(e.is_colliding());
        assert!(e.refresh_collision_display(t + Duration::from_millis(400)));
    }

    #[test]
    fn test_display_color_priority() {
        let mut e = circle_at(DVec2::new(50.0, 50.0), 10.0);
        let base = e.base_color();

        e.set_hovered(true);
        assert_eq!(e.display_color(), base.brighter());

        e.mark_colliding(Instant::now());
        assert_eq!(e.display_color(), Color::new(245, 155, 55));
        assert_eq!(e.outline(), Outline::Heavy);

        e.set_paused(true);
        assert_eq!(e.outline(), Outline::Dashed);
    }

    #[test]
    fn test_brighter_matches_awt() {
        assert_eq!(Color::new(0, 0, 0).brighter(), Color::new(3, 3, 3));
        assert_eq!(Color::new(1, 0, 70).brighter(), Color::new(4, 0, 100));
        assert_eq!(Color::new(255, 200, 10).brighter(), Color::new(255, 255, 14));
    }

    #[test]
    fn test_geometry_follows_position() {
        let mut e = circle_at(DVec2::new(100.0, 100.0), 10.0);
        assert_eq!(e.bounds().min, DVec2::new(90.0, 90.0));
        e.pos += DVec2::new(5.0, 0.0);
        assert_eq!(e.center(), DVec2::new(105.0, 100.0));
        assert!(e.contains(DVec2::new(114.0, 100.0)));
    }

    #[test]
    fn test_rectangle_aspect() {
        let e = Entity::new(
            EntityId(2),
            ShapeKind::Rectangle,
            DVec2::ZERO,
            DVec2::ONE,
            20.0,
            Color::new(0, 0, 0),
        )
        .with_aspect(0.5);
        assert_eq!(e.extent(), DVec2::new(20.0, 10.0));

        let c = Entity::new(EntityId(3), ShapeKind::Circle, DVec2::ZERO, DVec2::ONE, 20.0, Color::new(0, 0, 0))
            .with_aspect(0.5);
        assert_eq!(c.aspect(), 1.0);
    }

    #[test]
    fn test_paused_pulled_inside_shrunk_canvas() {
        let mut e = circle_at(DVec2::new(300.0, 250.0), 10.0);
        e.set_paused(true);
        let vel = e.vel;
        let small = Rect::new(DVec2::ZERO, DVec2::new(200.0, 150.0));

        e.advance(Trajectory::Straight, &small, Instant::now());
        assert_eq!(e.bounds().max, DVec2::new(200.0, 150.0));
        assert_eq!(e.vel, vel);
        assert!(e.is_paused());
    }

    #[test]
    fn test_non_positive_size_rejected() {
        let e = Entity::new(EntityId(4), ShapeKind::Triangle, DVec2::ZERO, DVec2::ONE, -3.0, Color::new(0, 0, 0));
        assert!(e.size() > 0.0);
    }
}
