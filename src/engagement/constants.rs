//! Engagement constants - fixed algorithm parameters
//!
//! Designer-facing tunables live in `EngagementConfig`; these are the
//! numbers the placement and ranking heuristics are built around.

// Ranking
pub const RANK_HYSTERESIS: f32 = 0.05;

// Slot search
pub const BACKLINE_LATERAL_SCALE: f32 = 0.7;
pub const SLOT_FORWARD_STEP_FACTOR: f32 = 0.4;
pub const SLOT_DISTANCE_PENALTY: f32 = 0.3;
pub const NO_NEIGHBOR_DISTANCE: f32 = 999.0;

/// Candidate offsets as (lateral steps, backward steps), searched in order
pub const SLOT_CANDIDATES: [(f32, f32); 9] = [
    (0.0, 0.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 0.5),
    (0.0, -0.5),
    (1.0, 0.5),
    (-1.0, 0.5),
    (1.0, -0.5),
    (-1.0, -0.5),
];

// Movement
pub const APPROACH_MIN_DISTANCE: f32 = 0.001; // closer than this to the target: hold
pub const SLOT_ARRIVAL_DISTANCE: f32 = 0.05;
pub const SEPARATION_MIN_DISTANCE: f32 = 0.0001;

// Attacking
pub const HARD_EXIT_RANGE_FACTOR: f32 = 2.0;
pub const MIN_ATTACK_INTERVAL: f32 = 0.05;
