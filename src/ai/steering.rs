//! Steering helpers for agent movement
//!
//! Constant-speed agents only need a heading; these helpers produce unit
//! direction vectors for the common moves (toward a point, away from a
//! threat, timed random roaming).

use glam::Vec2;
use rand::Rng;

/// Unit direction from `position` toward `target` (zero if coincident)
#[must_use]
pub fn seek(position: Vec2, target: Vec2) -> Vec2 {
    (target - position).normalize_or_zero()
}

/// Unit direction from `position` away from `threat` (zero if coincident)
#[must_use]
pub fn flee(position: Vec2, threat: Vec2) -> Vec2 {
    (position - threat).normalize_or_zero()
}

/// A uniformly random unit heading
pub fn random_direction<R: Rng>(rng: &mut R) -> Vec2 {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    Vec2::new(angle.cos(), angle.sin())
}

/// Timed random roaming: hold a heading for a while, then pick a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roam {
    /// Current heading
    direction: Vec2,
    /// Time left before a new heading is drawn
    retarget: f32,
}

impl Roam {
    /// Advance the retarget timer and return the heading to move along.
    pub fn direction<R: Rng>(&mut self, rng: &mut R, dt: f32) -> Vec2 {
        self.retarget -= dt;
        if self.retarget <= 0.0 {
            self.direction = random_direction(rng);
            self.retarget = rng.gen_range(1.0..3.0);
        }
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_seek_points_at_target() {
        let direction = seek(Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!(direction.x > 0.99);
        assert!((direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_flee_points_away() {
        let direction = flee(Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!(direction.x < -0.99);
    }

    #[test]
    fn test_degenerate_inputs_are_zero() {
        let p = Vec2::new(3.0, 4.0);
        assert_eq!(seek(p, p), Vec2::ZERO);
        assert_eq!(flee(p, p), Vec2::ZERO);
    }

    #[test]
    fn test_random_direction_is_unit_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..16 {
            let d = random_direction(&mut rng);
            assert!((d.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_roam_holds_heading_between_retargets() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut roam = Roam::default();

        let first = roam.direction(&mut rng, 0.1);
        // Shortest possible retarget is 1s, so the heading must hold here
        let second = roam.direction(&mut rng, 0.1);
        assert_eq!(first, second);

        // After the longest possible retarget window it must have changed
        let third = roam.direction(&mut rng, 3.1);
        assert_ne!(first, third);
    }
}
