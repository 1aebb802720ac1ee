//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed time is passed in, never read from a clock
//! - Seeded RNG only
//! - Deferred work goes through the tick-drained scheduler, never timers
//! - No rendering or platform dependencies

pub mod actor;
pub mod celebration;
pub mod collision;
pub mod effects;
pub mod obstacle;
pub mod powerup;
pub mod state;
pub mod tick;

pub use actor::Bat;
pub use celebration::{CaveTheme, Celebrations, Scheduled, ScheduledKind, Scheduler};
pub use collision::{HazardResponse, Rect, resolve_hazard};
pub use effects::{ActiveEffects, EffectKind, EffectSlot};
pub use obstacle::{Archetype, ArchetypeTable, Obstacle, ObstacleStream};
pub use powerup::{PowerUp, PowerUpKind, PowerUpStream};
pub use state::{GameEvent, GamePhase, GameState, Playfield, RunConfig, RunSummary};
pub use tick::{TickInput, tick};
