//! Vegetation growth cycle and fertilizer byproducts
//!
//! Each tile carries one vegetation slot advancing through
//! Seed → Germination → Grown → Wilt → Seed on an age clock, short-circuited
//! to Eaten by grazing. Grazing leaves a byproduct behind that seeds
//! neighboring bare tiles once near the end of its life.

use glam::{IVec2, Vec2};
use rand::Rng;

use crate::ai::Grid;

/// Growth stage thresholds in seconds of age
const GERMINATION_AGE: f32 = 5.0;
const GROWN_AGE: f32 = 10.0;
const WILT_AGE: f32 = 15.0;
const RESEED_AGE: f32 = 20.0;

/// Age advances at double speed to fast-forward growth
const GROWTH_RATE: f32 = 2.0;

/// Seconds a grazed tile waits before resprouting
const REGROW_DELAY: f32 = 40.0;

/// Age sentinel for tiles with no growing vegetation
pub const DORMANT_AGE: f32 = -1.0;

/// Seconds a byproduct persists
pub const BYPRODUCT_DURATION: f32 = 5.0;

/// Remaining duration at which a byproduct seeds its neighbors
const BYPRODUCT_SPREAD_AT: f32 = 1.0;

/// Growth-cycle stage of one tile's vegetation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VegetationState {
    /// Bare tile, nothing will grow until seeded
    None,
    Seed,
    Germination,
    Grown,
    Wilt,
    /// Grazed; regrows to Seed after a fixed delay
    Eaten,
}

/// Vegetation slot for a single tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vegetation {
    pub state: VegetationState,
    pub age: f32,
    pub regrow_timer: f32,
    pub has_fertilizer: bool,
}

impl Vegetation {
    #[must_use]
    pub fn dormant() -> Self {
        Self {
            state: VegetationState::None,
            age: DORMANT_AGE,
            regrow_timer: 0.0,
            has_fertilizer: false,
        }
    }

    /// Edible/renderable: anything except bare and grazed tiles
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !matches!(self.state, VegetationState::None | VegetationState::Eaten)
    }

    /// Graze this tile, short-circuiting the growth cycle
    pub fn graze(&mut self) {
        self.state = VegetationState::Eaten;
        self.age = DORMANT_AGE;
        self.regrow_timer = 0.0;
    }

    /// Advance the growth cycle by `dt`
    pub fn update(&mut self, dt: f32) {
        match self.state {
            VegetationState::None => return,
            VegetationState::Eaten => {
                self.regrow_timer += dt;
                if self.regrow_timer > REGROW_DELAY {
                    self.state = VegetationState::Seed;
                    self.age = 0.0;
                    self.regrow_timer = 0.0;
                }
                return;
            }
            VegetationState::Seed => {
                if self.age > GERMINATION_AGE {
                    self.state = VegetationState::Germination;
                }
            }
            VegetationState::Germination => {
                if self.age > GROWN_AGE {
                    self.state = VegetationState::Grown;
                }
            }
            VegetationState::Grown => {
                if self.age > WILT_AGE {
                    self.state = VegetationState::Wilt;
                }
            }
            VegetationState::Wilt => {
                if self.age > RESEED_AGE {
                    self.state = VegetationState::Seed;
                    self.age = 0.0;
                    self.regrow_timer = 0.0;
                }
            }
        }
        self.age += dt * GROWTH_RATE;
    }
}

/// Dense per-tile vegetation layer
pub struct Ecology {
    width: i32,
    height: i32,
    tiles: Vec<Vegetation>,
}

impl Ecology {
    /// All tiles start bare
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![Vegetation::dormant(); (width * height) as usize],
        }
    }

    /// Germinate a random share of tiles with randomized ages
    pub fn seed_random<R: Rng>(&mut self, rng: &mut R, chance: f32) {
        for tile in &mut self.tiles {
            if rng.gen_range(0.0..1.0) < chance {
                tile.state = VegetationState::Germination;
                tile.age = rng.gen_range(0.01..=1.0);
            }
        }
    }

    fn index(&self, coord: IVec2) -> Option<usize> {
        if coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height {
            Some((coord.y * self.width + coord.x) as usize)
        } else {
            None
        }
    }

    /// Vegetation at a coordinate, if it is in range
    #[must_use]
    pub fn get(&self, coord: IVec2) -> Option<&Vegetation> {
        self.index(coord).map(|i| &self.tiles[i])
    }

    /// Live vegetation lookup; out-of-range coordinates are simply false
    #[must_use]
    pub fn has_live_at(&self, coord: IVec2) -> bool {
        self.get(coord).is_some_and(Vegetation::is_alive)
    }

    /// Nearest tile with live vegetation, by straight-line tile distance
    #[must_use]
    pub fn nearest_live(&self, from: IVec2) -> Option<IVec2> {
        let mut nearest: Option<(IVec2, f32)> = None;
        for (coord, tile) in self.iter() {
            if !tile.is_alive() {
                continue;
            }
            let distance = (coord - from).as_vec2().length_squared();
            if nearest.is_none_or(|(_, best)| distance < best) {
                nearest = Some((coord, distance));
            }
        }
        nearest.map(|(coord, _)| coord)
    }

    /// Advance every tile's growth cycle
    pub fn update(&mut self, dt: f32) {
        for tile in &mut self.tiles {
            tile.update(dt);
        }
    }

    /// Graze the vegetation at a coordinate. Returns false if there was
    /// nothing live to eat.
    pub fn graze_at(&mut self, coord: IVec2) -> bool {
        match self.index(coord) {
            Some(i) if self.tiles[i].is_alive() => {
                self.tiles[i].graze();
                true
            }
            _ => false,
        }
    }

    /// Editor setter: overwrite a tile's state and age together
    pub fn set_vegetation(&mut self, coord: IVec2, state: VegetationState, age: f32) {
        if let Some(i) = self.index(coord) {
            self.tiles[i].state = state;
            self.tiles[i].age = age;
            self.tiles[i].regrow_timer = 0.0;
        }
    }

    /// Editor setter: return a tile to bare ground
    pub fn clear_vegetation(&mut self, coord: IVec2) {
        if let Some(i) = self.index(coord) {
            self.tiles[i] = Vegetation::dormant();
        }
    }

    /// Seed a bare tile (byproduct spreading); live or regrowing tiles are
    /// left untouched
    fn sow_if_bare(&mut self, coord: IVec2) {
        if let Some(i) = self.index(coord) {
            if self.tiles[i].state == VegetationState::None {
                self.tiles[i].state = VegetationState::Seed;
                self.tiles[i].age = 0.0;
                self.tiles[i].regrow_timer = 0.0;
                self.tiles[i].has_fertilizer = true;
            }
        }
    }

    /// Iterate all tiles with their coordinates, row-major
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &Vegetation)> {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (IVec2::new(i as i32 % width, i as i32 / width), tile))
    }
}

/// Fertilizer deposit left behind after grazing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Byproduct {
    pub position: Vec2,
    pub duration: f32,
    pub quality: f32,
    pub active: bool,
    pub has_spread: bool,
}

impl Byproduct {
    #[must_use]
    pub fn new(position: Vec2, quality: f32) -> Self {
        Self {
            position,
            duration: BYPRODUCT_DURATION,
            quality,
            active: true,
            has_spread: false,
        }
    }

    /// Remaining life as a 0..=1 fraction (renderers fade on this)
    #[must_use]
    pub fn life_fraction(&self) -> f32 {
        (self.duration / BYPRODUCT_DURATION).max(0.0)
    }

    /// Tick lifetime down; fires the one-shot seeding near end of life.
    /// Returns true on the tick the seeding happened.
    pub fn update(&mut self, dt: f32, grid: &Grid, ecology: &mut Ecology) -> bool {
        if !self.active {
            return false;
        }
        self.duration -= dt;

        let mut spread = false;
        if !self.has_spread && self.duration <= BYPRODUCT_SPREAD_AT {
            self.spread(grid, ecology);
            self.has_spread = true;
            spread = true;
        }
        if self.duration <= 0.0 {
            self.active = false;
        }
        spread
    }

    /// Seed the four adjacent tiles that are currently bare
    fn spread(&self, grid: &Grid, ecology: &mut Ecology) {
        let tile = grid.position_to_tile(self.position);
        const NEIGHBORS: [IVec2; 4] = [
            IVec2::new(0, -1),
            IVec2::new(0, 1),
            IVec2::new(-1, 0),
            IVec2::new(1, 0),
        ];
        for offset in NEIGHBORS {
            ecology.sow_if_bare(tile + offset);
        }
    }
}
