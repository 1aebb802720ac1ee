//! Rock obstacles and the stream that spawns and retires them
//!
//! Each obstacle is a stalactite/stalagmite pair with a gap between them.
//! Archetypes change the gap size or animate it; the stream picks
//! archetypes from a weighted table and sometimes commits to a short
//! streak of one archetype.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::state::{Playfield, RunConfig};
use crate::consts::*;

/// Obstacle behaviour variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Normal,
    Narrow,
    Wide,
    Moving,
    Rotating,
}

impl Archetype {
    /// Archetypes a streak may repeat
    pub const STREAKABLE: [Archetype; 3] = [Archetype::Narrow, Archetype::Wide, Archetype::Moving];

    /// Multiplier applied to the configured gap
    pub fn gap_factor(&self) -> f32 {
        match self {
            Archetype::Narrow => NARROW_GAP_FACTOR,
            Archetype::Wide => WIDE_GAP_FACTOR,
            Archetype::Normal | Archetype::Moving | Archetype::Rotating => 1.0,
        }
    }

    /// Base points for passing the obstacle
    pub fn points(&self) -> u32 {
        match self {
            Archetype::Normal | Archetype::Wide => 1,
            Archetype::Narrow | Archetype::Rotating => 2,
            Archetype::Moving => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Normal => "normal",
            Archetype::Narrow => "narrow",
            Archetype::Wide => "wide",
            Archetype::Moving => "moving",
            Archetype::Rotating => "rotating",
        }
    }
}

/// Weighted archetype probabilities (weights sum to 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeTable {
    pub weights: [(Archetype, f64); 5],
}

impl ArchetypeTable {
    pub const STANDARD: ArchetypeTable = ArchetypeTable {
        weights: [
            (Archetype::Normal, 0.65),
            (Archetype::Narrow, 0.15),
            (Archetype::Wide, 0.15),
            (Archetype::Moving, 0.04),
            (Archetype::Rotating, 0.01),
        ],
    };

    pub const EXTREME: ArchetypeTable = ArchetypeTable {
        weights: [
            (Archetype::Normal, 0.30),
            (Archetype::Narrow, 0.25),
            (Archetype::Wide, 0.20),
            (Archetype::Moving, 0.15),
            (Archetype::Rotating, 0.10),
        ],
    };

    /// Map a roll in [0, 1) onto the cumulative distribution
    pub fn pick(&self, roll: f64) -> Archetype {
        let mut cumulative = 0.0;
        for (archetype, weight) in self.weights {
            cumulative += weight;
            if roll <= cumulative {
                return archetype;
            }
        }
        Archetype::Normal
    }
}

impl Default for ArchetypeTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Archetype-specific kinetics
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Fixed,
    /// Gap centre oscillates within `origin ± MOVING_RANGE`
    Oscillate { origin: f32, direction: f32 },
    /// Render-only rotation about the gap centre
    Spin { angle: f32 },
}

/// A single rock pair
#[derive(Debug, Clone)]
pub struct Obstacle {
    /// Left edge; only ever decreases
    pub x: f32,
    pub width: f32,
    pub gap: f32,
    /// Gap centre
    pub gap_y: f32,
    pub archetype: Archetype,
    /// Set once, when the bat passes the midpoint
    pub scored: bool,
    pub motion: Motion,
    /// Cosmetic pulse phase
    pub anim_phase: f32,
}

impl Obstacle {
    pub fn new(x: f32, gap: f32, gap_y: f32, archetype: Archetype, playfield_height: f32) -> Self {
        let motion = match archetype {
            Archetype::Moving => Motion::Oscillate {
                origin: gap_y,
                direction: 1.0,
            },
            Archetype::Rotating => Motion::Spin { angle: 0.0 },
            Archetype::Normal | Archetype::Narrow | Archetype::Wide => Motion::Fixed,
        };
        let mut obstacle = Self {
            x,
            width: OBSTACLE_WIDTH,
            gap: gap * archetype.gap_factor(),
            gap_y,
            archetype,
            scored: false,
            motion,
            anim_phase: 0.0,
        };
        obstacle.clamp_gap(playfield_height);
        obstacle
    }

    /// Bottom edge of the upper rock
    #[inline]
    pub fn top_height(&self) -> f32 {
        self.gap_y - self.gap / 2.0
    }

    /// Top edge of the lower rock
    #[inline]
    pub fn bottom_y(&self) -> f32 {
        self.gap_y + self.gap / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Rotation angle for rendering (zero unless spinning)
    pub fn angle(&self) -> f32 {
        match self.motion {
            Motion::Spin { angle } => angle,
            Motion::Fixed | Motion::Oscillate { .. } => 0.0,
        }
    }

    /// +1 while the gap moves down, -1 while it moves up, 0 if static
    pub fn direction(&self) -> f32 {
        match self.motion {
            Motion::Oscillate { direction, .. } => direction,
            Motion::Fixed | Motion::Spin { .. } => 0.0,
        }
    }

    /// Advance archetype kinetics
    pub fn update(&mut self, dt_ms: f32, playfield_height: f32) {
        let frames = dt_ms / FRAME_MS;
        self.anim_phase += 0.05 * frames;

        match &mut self.motion {
            Motion::Fixed => {}
            Motion::Oscillate { origin, direction } => {
                self.gap_y += *direction * MOVING_SPEED * frames;
                let (low, high) = (*origin - MOVING_RANGE, *origin + MOVING_RANGE);
                if self.gap_y <= low {
                    self.gap_y = low;
                    *direction = 1.0;
                } else if self.gap_y >= high {
                    self.gap_y = high;
                    *direction = -1.0;
                }
            }
            Motion::Spin { angle } => {
                *angle += ROTATION_SPEED * frames;
            }
        }

        self.clamp_gap(playfield_height);
    }

    /// Keep both gap edges inside the cave (ceiling to floor strip)
    fn clamp_gap(&mut self, playfield_height: f32) {
        if self.top_height() < 0.0 {
            self.gap_y = self.gap / 2.0;
        }
        let floor = playfield_height - GROUND_HEIGHT;
        if self.bottom_y() > floor {
            self.gap_y = floor - self.gap / 2.0;
        }
    }

    /// The two solid spans above and below the gap.
    ///
    /// Rotating rocks are not hit-tested as rotated shapes; both spans are
    /// narrowed by a fixed margin instead.
    pub fn solid_spans(&self, playfield_height: f32) -> [Rect; 2] {
        let margin = match self.archetype {
            Archetype::Rotating => ROTATING_COLLISION_MARGIN,
            _ => 0.0,
        };
        let x = self.x + margin;
        let width = self.width - margin * 2.0;
        [
            Rect::new(x, 0.0, width, self.top_height()),
            Rect::new(x, self.bottom_y(), width, playfield_height - self.bottom_y()),
        ]
    }

    pub fn collides(&self, hitbox: &Rect, playfield_height: f32) -> bool {
        self.solid_spans(playfield_height)
            .iter()
            .any(|span| hitbox.overlaps(span))
    }

    pub fn is_off_screen(&self) -> bool {
        self.right() < 0.0
    }

    /// Award base points the first time the bat centre passes the midpoint
    pub fn try_score(&mut self, bat_center_x: f32) -> Option<u32> {
        if self.scored || bat_center_x <= self.center_x() {
            return None;
        }
        self.scored = true;
        Some(self.archetype.points())
    }
}

/// A committed run of one archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streak {
    pub archetype: Archetype,
    /// Spawns still owed to the streak
    pub remaining: u32,
}

/// Points awarded for one passed obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Passed {
    pub archetype: Archetype,
    pub points: u32,
}

/// Ordered obstacles, oldest (leftmost) first
#[derive(Debug, Clone)]
pub struct ObstacleStream {
    pub obstacles: Vec<Obstacle>,
    pub gap: f32,
    pub speed: f32,
    pub spawn_distance: f32,
    pub table: ArchetypeTable,
    streak: Option<Streak>,
}

impl Default for ObstacleStream {
    fn default() -> Self {
        Self::new(&RunConfig::default())
    }
}

impl ObstacleStream {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            obstacles: Vec::new(),
            gap: config.gap,
            speed: config.obstacle_speed,
            spawn_distance: config.spawn_distance,
            table: config.archetypes,
            streak: None,
        }
    }

    /// Apply run settings and clear everything from the previous run
    pub fn reset(&mut self, config: &RunConfig) {
        *self = Self::new(config);
    }

    pub fn streak(&self) -> Option<Streak> {
        self.streak
    }

    /// Scroll, animate, retire and spawn
    pub fn update<R: Rng>(&mut self, dt_ms: f32, field: Playfield, rng: &mut R) {
        let frames = dt_ms / FRAME_MS;
        for obstacle in self.obstacles.iter_mut() {
            obstacle.x -= self.speed * frames;
            obstacle.update(dt_ms, field.height);
        }
        self.obstacles.retain(|o| !o.is_off_screen());
        self.spawn_if_needed(field, rng);
    }

    /// Spawn at the right edge once the newest rock has cleared the spawn distance
    pub fn spawn_if_needed<R: Rng>(&mut self, field: Playfield, rng: &mut R) -> bool {
        let should_spawn = match self.obstacles.last() {
            None => true,
            Some(last) => field.width - last.right() >= self.spawn_distance,
        };
        if !should_spawn {
            return false;
        }

        let gap_y = self.next_gap_y(field, rng);
        let archetype = self.next_archetype(rng);
        log::debug!("Spawning {} obstacle at gap centre {:.0}", archetype.as_str(), gap_y);
        self.obstacles
            .push(Obstacle::new(field.width, self.gap, gap_y, archetype, field.height));
        true
    }

    /// Gap centre: uniform for the first rock, then within ±MAX_GAP_DELTA of the last
    pub fn next_gap_y<R: Rng>(&self, field: Playfield, rng: &mut R) -> f32 {
        let min_y = self.gap / 2.0 + GAP_TOP_MARGIN;
        let max_y = field.height - self.gap / 2.0 - GAP_BOTTOM_MARGIN;
        if max_y <= min_y {
            return (min_y + max_y) / 2.0;
        }

        match self.obstacles.last() {
            Some(last) => {
                let delta = (rng.random::<f32>() - 0.5) * MAX_GAP_DELTA * 2.0;
                (last.gap_y + delta).clamp(min_y, max_y)
            }
            None => min_y + rng.random::<f32>() * (max_y - min_y),
        }
    }

    /// Continue a streak, maybe start one, or draw from the table
    pub fn next_archetype<R: Rng>(&mut self, rng: &mut R) -> Archetype {
        if let Some(streak) = self.streak.as_mut() {
            if streak.remaining > 0 {
                streak.remaining -= 1;
                let archetype = streak.archetype;
                if streak.remaining == 0 {
                    self.streak = None;
                }
                return archetype;
            }
            self.streak = None;
        }

        if rng.random_bool(STREAK_CHANCE) {
            let archetype =
                Archetype::STREAKABLE[rng.random_range(0..Archetype::STREAKABLE.len())];
            let length = rng.random_range(STREAK_MIN..=STREAK_MAX);
            // This spawn is the first of the streak
            self.streak = Some(Streak {
                archetype,
                remaining: length - 1,
            });
            log::debug!("Starting {} streak of {}", archetype.as_str(), length);
            return archetype;
        }

        self.table.pick(rng.random::<f64>())
    }

    /// First obstacle hit short-circuits
    pub fn collides(&self, hitbox: &Rect, playfield_height: f32) -> bool {
        self.obstacles
            .iter()
            .any(|o| o.collides(hitbox, playfield_height))
    }

    /// Score every obstacle the bat passed this tick
    pub fn collect_scores(&mut self, bat_center_x: f32, multiplier: bool) -> Vec<Passed> {
        self.obstacles
            .iter_mut()
            .filter_map(|o| {
                o.try_score(bat_center_x).map(|base| Passed {
                    archetype: o.archetype,
                    points: if multiplier { base * 2 } else { base },
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FIELD: Playfield = Playfield {
        width: 480.0,
        height: 720.0,
    };

    #[test]
    fn test_gap_geometry() {
        let normal = Obstacle::new(480.0, 120.0, 200.0, Archetype::Normal, 720.0);
        assert_eq!(normal.top_height(), 140.0);
        assert_eq!(normal.bottom_y(), 260.0);

        let narrow = Obstacle::new(480.0, 120.0, 200.0, Archetype::Narrow, 720.0);
        assert!((narrow.gap - 84.0).abs() < 1e-4);
        assert!((narrow.top_height() - 158.0).abs() < 1e-4);
        assert!((narrow.bottom_y() - 242.0).abs() < 1e-4);

        let wide = Obstacle::new(480.0, 120.0, 200.0, Archetype::Wide, 720.0);
        assert_eq!(wide.gap, 180.0);
    }

    #[test]
    fn test_gap_clamped_to_cave() {
        let high = Obstacle::new(0.0, 120.0, 10.0, Archetype::Normal, 720.0);
        assert_eq!(high.top_height(), 0.0);
        let low = Obstacle::new(0.0, 120.0, 710.0, Archetype::Normal, 720.0);
        assert_eq!(low.bottom_y(), 700.0);
    }

    #[test]
    fn test_moving_gap_oscillates_within_range() {
        let mut obstacle = Obstacle::new(300.0, 120.0, 360.0, Archetype::Moving, 720.0);
        let mut saw_up = false;
        let mut saw_down = false;
        for _ in 0..200 {
            obstacle.update(16.0, 720.0);
            assert!(obstacle.gap_y >= 360.0 - MOVING_RANGE);
            assert!(obstacle.gap_y <= 360.0 + MOVING_RANGE);
            saw_down |= obstacle.direction() > 0.0;
            saw_up |= obstacle.direction() < 0.0;
        }
        assert!(saw_up && saw_down);
    }

    #[test]
    fn test_rotating_spans_are_narrowed() {
        let mut obstacle = Obstacle::new(100.0, 120.0, 360.0, Archetype::Rotating, 720.0);
        obstacle.update(160.0, 720.0);
        assert!(obstacle.angle() > 0.0);

        let [top, bottom] = obstacle.solid_spans(720.0);
        assert_eq!(top.x, 120.0);
        assert_eq!(top.width, OBSTACLE_WIDTH - 40.0);
        assert_eq!(bottom.width, OBSTACLE_WIDTH - 40.0);

        // Clips the rock edge that a normal obstacle would count
        let edge_hit = Rect::new(102.0, 10.0, 10.0, 10.0);
        assert!(!obstacle.collides(&edge_hit, 720.0));
        let normal = Obstacle::new(100.0, 120.0, 360.0, Archetype::Normal, 720.0);
        assert!(normal.collides(&edge_hit, 720.0));
    }

    #[test]
    fn test_collision_above_and_below_gap() {
        let obstacle = Obstacle::new(100.0, 120.0, 360.0, Archetype::Normal, 720.0);
        assert!(obstacle.collides(&Rect::new(110.0, 280.0, 26.0, 21.0), 720.0));
        assert!(obstacle.collides(&Rect::new(110.0, 415.0, 26.0, 21.0), 720.0));
        assert!(!obstacle.collides(&Rect::new(110.0, 350.0, 26.0, 21.0), 720.0));
        assert!(!obstacle.collides(&Rect::new(10.0, 10.0, 26.0, 21.0), 720.0));
    }

    #[test]
    fn test_scoring_exactly_once() {
        let mut obstacle = Obstacle::new(100.0, 120.0, 360.0, Archetype::Moving, 720.0);
        assert_eq!(obstacle.try_score(129.0), None);
        assert_eq!(obstacle.try_score(131.0), Some(3));
        assert_eq!(obstacle.try_score(131.0), None);
        assert_eq!(obstacle.try_score(400.0), None);
    }

    #[test]
    fn test_multiplier_doubles_points() {
        let mut stream = ObstacleStream::default();
        stream
            .obstacles
            .push(Obstacle::new(0.0, 120.0, 360.0, Archetype::Narrow, 720.0));
        stream
            .obstacles
            .push(Obstacle::new(10.0, 120.0, 360.0, Archetype::Normal, 720.0));
        let passed = stream.collect_scores(200.0, true);
        assert_eq!(passed.iter().map(|p| p.points).collect::<Vec<_>>(), vec![4, 2]);
        assert!(stream.collect_scores(200.0, true).is_empty());
    }

    #[test]
    fn test_table_pick() {
        let table = ArchetypeTable::STANDARD;
        assert_eq!(table.pick(0.0), Archetype::Normal);
        assert_eq!(table.pick(0.65), Archetype::Normal);
        assert_eq!(table.pick(0.7), Archetype::Narrow);
        assert_eq!(table.pick(0.9), Archetype::Wide);
        assert_eq!(table.pick(0.97), Archetype::Moving);
        assert_eq!(table.pick(0.995), Archetype::Rotating);
    }

    #[test]
    fn test_streak_is_consumed() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut stream = ObstacleStream::default();
        stream.streak = Some(Streak {
            archetype: Archetype::Wide,
            remaining: 2,
        });
        assert_eq!(stream.next_archetype(&mut rng), Archetype::Wide);
        assert_eq!(stream.next_archetype(&mut rng), Archetype::Wide);
        assert_eq!(stream.streak(), None);
    }

    #[test]
    fn test_streaks_stay_in_bounds() {
        let mut rng = Pcg32::seed_from_u64(99);
        let mut stream = ObstacleStream::default();
        let mut started = 0;
        for _ in 0..2000 {
            let before = stream.streak();
            let archetype = stream.next_archetype(&mut rng);
            if before.is_none() {
                if let Some(streak) = stream.streak() {
                    started += 1;
                    assert!(streak.remaining >= STREAK_MIN - 1);
                    assert!(streak.remaining <= STREAK_MAX - 1);
                    assert_ne!(streak.archetype, Archetype::Normal);
                    assert_eq!(streak.archetype, archetype);
                }
            }
        }
        assert!(started > 0);
    }

    #[test]
    fn test_spawn_cadence() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut stream = ObstacleStream::default();
        assert!(stream.spawn_if_needed(FIELD, &mut rng));
        assert!(!stream.spawn_if_needed(FIELD, &mut rng));

        // Scroll until the newest rock's trailing edge is a spawn distance away
        let travel = stream.spawn_distance + OBSTACLE_WIDTH;
        let frames = (travel / stream.speed).ceil() as usize;
        for _ in 0..frames - 1 {
            stream.update(16.0, FIELD, &mut rng);
        }
        assert_eq!(stream.obstacles.len(), 1);
        stream.update(16.0, FIELD, &mut rng);
        assert_eq!(stream.obstacles.len(), 2);
    }

    #[test]
    fn test_off_screen_obstacles_retire() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut stream = ObstacleStream::default();
        stream
            .obstacles
            .push(Obstacle::new(-59.0, 120.0, 360.0, Archetype::Normal, 720.0));
        stream.update(16.0, FIELD, &mut rng);
        assert!(stream.obstacles.iter().all(|o| o.x > 0.0));
    }

    #[test]
    fn test_gap_follows_previous() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut stream = ObstacleStream::default();
        stream.spawn_if_needed(FIELD, &mut rng);
        for _ in 0..50 {
            let previous = stream.obstacles.last().map(|o| o.gap_y).unwrap_or_default();
            let next = stream.next_gap_y(FIELD, &mut rng);
            assert!((next - previous).abs() <= MAX_GAP_DELTA + 1e-3);
            stream.obstacles.push(Obstacle::new(
                FIELD.width,
                stream.gap,
                next,
                Archetype::Normal,
                FIELD.height,
            ));
        }
    }

    proptest! {
        #[test]
        fn prop_gap_stays_inside_cave(
            seed in any::<u64>(),
            height in 300.0f32..1200.0,
            ticks in 1usize..400,
        ) {
            let field = Playfield { width: 480.0, height };
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut stream = ObstacleStream::new(&RunConfig {
                archetypes: ArchetypeTable::EXTREME,
                ..RunConfig::default()
            });
            for _ in 0..ticks {
                stream.update(16.0, field, &mut rng);
                for obstacle in &stream.obstacles {
                    prop_assert!(obstacle.top_height() >= -1e-3);
                    prop_assert!(obstacle.bottom_y() <= height - GROUND_HEIGHT + 1e-3);
                }
            }
        }
    }
}
