//! Shared spatial components for simulation agents

use glam::Vec2;

/// Physical presence of an agent: continuous position, facing, size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Position in world space
    pub position: Vec2,
    /// Facing direction (unit-length or zero while idle)
    pub direction: Vec2,
    /// Collision/selection radius
    pub radius: f32,
}

impl Body {
    /// Create a body at a position with a given radius
    #[must_use]
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            direction: Vec2::ZERO,
            radius,
        }
    }

    /// Move along `direction` at `speed` for `dt`, updating the facing
    pub fn advance(&mut self, direction: Vec2, speed: f32, dt: f32) {
        self.direction = direction;
        self.position += direction * speed * dt;
    }
}

/// Health and hunger accumulators shared by herbivores and predators
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vitals {
    /// Current health, 0..=max
    pub health: f32,
    /// Time-accumulated hunger, reset by feeding
    pub hunger: f32,
}

impl Vitals {
    /// Full health, no hunger
    #[must_use]
    pub fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            hunger: 0.0,
        }
    }

    /// Drain health at `rate` per second once hunger exceeds `threshold`.
    /// Returns true when health reaches zero.
    pub fn starve(&mut self, threshold: f32, rate: f32, dt: f32) -> bool {
        if self.hunger > threshold {
            self.health -= rate * dt;
            if self.health <= 0.0 {
                self.health = 0.0;
                return true;
            }
        }
        false
    }

    /// Heal by `amount`, clamped to `max_health`
    pub fn heal(&mut self, amount: f32, max_health: f32) {
        self.health = (self.health + amount).min(max_health);
    }
}

/// Axis-aligned world bounds that agents are kept inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Top-left corner
    pub min: Vec2,
    /// Bottom-right corner
    pub max: Vec2,
}

impl Bounds {
    /// Construct from a corner and a size
    #[must_use]
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    /// Geometric center
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Whether a point lies inside the bounds
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Clamp a point to lie at least `inset` inside the bounds
    #[must_use]
    pub fn clamp_inset(&self, point: Vec2, inset: f32) -> Vec2 {
        point.clamp(self.min + Vec2::splat(inset), self.max - Vec2::splat(inset))
    }

    /// Keep a body inside the bounds, reflecting the direction component
    /// along any boundary it ran into.
    pub fn contain(&self, body: &mut Body) {
        if body.position.x < self.min.x + body.radius {
            body.position.x = self.min.x + body.radius;
            body.direction.x = -body.direction.x;
        }
        if body.position.x > self.max.x - body.radius {
            body.position.x = self.max.x - body.radius;
            body.direction.x = -body.direction.x;
        }
        if body.position.y < self.min.y + body.radius {
            body.position.y = self.min.y + body.radius;
            body.direction.y = -body.direction.y;
        }
        if body.position.y > self.max.y - body.radius {
            body.position.y = self.max.y - body.radius;
            body.direction.y = -body.direction.y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_updates_position_and_facing() {
        let mut body = Body::new(Vec2::ZERO, 5.0);
        body.advance(Vec2::X, 70.0, 0.5);
        assert_eq!(body.position, Vec2::new(35.0, 0.0));
        assert_eq!(body.direction, Vec2::X);
    }

    #[test]
    fn test_starve_only_past_threshold() {
        let mut vitals = Vitals::new(100.0);
        vitals.hunger = 5.0;
        assert!(!vitals.starve(10.0, 60.0, 0.1));
        assert_eq!(vitals.health, 100.0);

        vitals.hunger = 12.0;
        assert!(!vitals.starve(10.0, 60.0, 0.1));
        assert!(vitals.health < 100.0);
    }

    #[test]
    fn test_starve_floors_at_zero_and_reports_death() {
        let mut vitals = Vitals::new(1.0);
        vitals.hunger = 100.0;
        assert!(vitals.starve(10.0, 60.0, 1.0));
        assert_eq!(vitals.health, 0.0);
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut vitals = Vitals::new(100.0);
        vitals.health = 90.0;
        vitals.heal(20.0, 100.0);
        assert_eq!(vitals.health, 100.0);
    }

    #[test]
    fn test_contain_clamps_and_reflects() {
        let bounds = Bounds::new(Vec2::ZERO, Vec2::new(100.0, 100.0));
        let mut body = Body::new(Vec2::new(-5.0, 50.0), 2.0);
        body.direction = Vec2::new(-1.0, 0.5);

        bounds.contain(&mut body);

        assert_eq!(body.position, Vec2::new(2.0, 50.0));
        assert_eq!(body.direction, Vec2::new(1.0, 0.5));
    }

    #[test]
    fn test_contain_reflects_both_axes_in_a_corner() {
        let bounds = Bounds::new(Vec2::ZERO, Vec2::new(100.0, 100.0));
        let mut body = Body::new(Vec2::new(105.0, 110.0), 1.0);
        body.direction = Vec2::new(1.0, 1.0);

        bounds.contain(&mut body);

        assert_eq!(body.position, Vec2::new(99.0, 99.0));
        assert_eq!(body.direction, Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn test_clamp_inset() {
        let bounds = Bounds::new(Vec2::ZERO, Vec2::new(100.0, 100.0));
        let clamped = bounds.clamp_inset(Vec2::new(200.0, -30.0), 10.0);
        assert_eq!(clamped, Vec2::new(90.0, 10.0));
    }
}
