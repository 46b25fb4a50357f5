//! Tunable constants for the pickleball simulation
//!
//! All gameplay values are defined here for easy tweaking.
//! Court units are feet, time is seconds.

// =============================================================================
// RATING SCALE
// =============================================================================

pub const MIN_RATING: f32 = 2.0;
pub const MAX_RATING: f32 = 8.0;
pub const STAT_MIN: i32 = 1;
pub const STAT_MAX: i32 = 99;

// =============================================================================
// COURT GEOMETRY
// =============================================================================

pub const COURT_HALF_WIDTH: f32 = 10.0; // Sidelines at x = ±10
pub const COURT_HALF_LENGTH: f32 = 22.0; // Baselines at y = ±22, net at y = 0
pub const KITCHEN_DEPTH: f32 = 7.0; // Non-volley zone extends 7ft from the net
pub const NET_HEIGHT: f32 = 2.9; // Average of 34in center / 36in posts
pub const OUT_OF_PLAY_MARGIN: f32 = 12.0; // Ball this far past a line is dead
pub const SERVE_DEPTH: f32 = 23.0; // Server stands just behind the baseline
pub const HOME_DEPTH: f32 = 19.0; // Ready position between rallies shots
pub const KITCHEN_LINE_DEPTH: f32 = 8.0; // Ready position when pressing the net

// =============================================================================
// BALL FLIGHT
// =============================================================================

pub const BALL_GRAVITY: f32 = 32.2;
pub const BALL_RESTITUTION: f32 = 0.55; // Vertical velocity retained per bounce
pub const BALL_BOUNCE_FRICTION: f32 = 0.8; // Horizontal velocity retained per bounce
pub const BALL_AIR_DRAG: f32 = 0.92; // Horizontal velocity retained after 1 second
pub const BALL_TOPSPIN_GRAVITY: f32 = 10.0; // Extra downward accel at full topspin
pub const BALL_SPIN_CURVE: f32 = 4.0; // Lateral accel at full sidespin
pub const BALL_SPIN_DECAY: f32 = 0.6; // Spin retained per second
pub const BALL_CONTACT_HEIGHT: f32 = 2.5; // Typical paddle contact height
pub const BALL_MIN_SPEED: f32 = 18.0; // Launch speed at zero power
pub const BALL_MAX_SPEED: f32 = 62.0; // Launch speed at full power
pub const BALL_STALL_SPEED: f32 = 1.5; // Below this on the ground the ball is dead
pub const BALL_STALL_FRAMES: u32 = 30;

// =============================================================================
// FULL POINT SIMULATION
// =============================================================================

pub const POINT_TICK: f32 = 1.0 / 120.0;
pub const POINT_CLOCK_LIMIT: f32 = 30.0; // Point awarded against last contact after this

// =============================================================================
// MATCH RULES
// =============================================================================

pub const POINTS_TO_WIN: u32 = 11;
pub const WIN_BY_MARGIN: u32 = 2;
pub const MAX_SCORE: u32 = 15;
pub const MAX_RALLIES: u32 = 500; // Safety cutoff

// =============================================================================
// RALLY MODEL (probabilistic simulator)
// =============================================================================

pub const RALLY_ACE_BASE: f64 = 0.05;
pub const RALLY_ACE_POWER_SCALE: f64 = 0.01;
pub const RALLY_ACE_REFLEX_SCALE: f64 = 0.01;
pub const RALLY_ACE_SENSITIVITY: f64 = 0.25;
pub const RALLY_ACE_MIN: f64 = 0.01;
pub const RALLY_ACE_MAX: f64 = 0.25;

pub const RALLY_WINNER_BASE: f64 = 0.10;
pub const RALLY_WINNER_SENSITIVITY: f64 = 0.30;
pub const RALLY_WINNER_PER_SHOT: f64 = 0.005;
pub const RALLY_WINNER_MIN: f64 = 0.02;
pub const RALLY_WINNER_MAX: f64 = 0.35;

pub const RALLY_ERROR_BASE: f64 = 0.58;
pub const RALLY_ERROR_PER_SHOT: f64 = 0.003;
pub const RALLY_ERROR_MIN: f64 = 0.02;
pub const RALLY_ERROR_MAX: f64 = 0.30;

pub const RALLY_FORCED_BASE: f64 = 0.08;
pub const RALLY_FORCED_SENSITIVITY: f64 = 0.30;
pub const RALLY_FORCED_MIN: f64 = 0.01;
pub const RALLY_FORCED_MAX: f64 = 0.20;

pub const RALLY_BASE_SHOTS: f64 = 5.0;
pub const MIN_RALLY_SHOTS: u32 = 6;
pub const MAX_RALLY_SHOTS: u32 = 14;
pub const RALLY_EXHAUSTION_SENSITIVITY: f64 = 1.0;

// =============================================================================
// DRILL PHYSICS (decision agents in the full simulator)
// =============================================================================

pub const AGENT_BASE_MOVE_SPEED: f32 = 16.0;
pub const AGENT_SPRINT_MULTIPLIER: f32 = 1.35;
pub const AGENT_SPRINT_DISTANCE: f32 = 6.0; // Sprint only when this far from target
pub const AGENT_SPRINT_DRAIN: f32 = 0.35; // Stamina per second while sprinting (at stamina stat 0)
pub const AGENT_STAMINA_REGEN: f32 = 0.15;
pub const AGENT_MIN_SPRINT_STAMINA: f32 = 0.2;
pub const AGENT_BASE_REACH: f32 = 2.2; // Planar reach radius at zero athleticism
pub const AGENT_REACH_BONUS: f32 = 1.3; // Extra reach at full athleticism
pub const AGENT_BASE_HIGH_REACH: f32 = 6.0; // Comfortable contact height
pub const AGENT_JUMP_REACH: f32 = 1.5; // Extra height reach at full athleticism
pub const AGENT_SLOW_FIRST_STEP: f32 = 0.55; // Seconds from standstill to full speed at reflexes 0
pub const AGENT_QUICK_FIRST_STEP: f32 = 0.15; // Same at reflexes 99
pub const AGENT_MIN_REACTION: f32 = 0.02;
pub const AGENT_MAX_REACTION: f32 = 0.10;
pub const AGENT_POSITION_NOISE: f32 = 2.5; // Std-dev of approach noise at positioning 0
pub const AGENT_AIM_NOISE: f32 = 3.0; // Std-dev of aim noise at accuracy 0
pub const AGENT_IMPATIENCE: f32 = 0.06; // Chance to hit early at focus 0

pub const DRILL_UNFORCED_BASE: f32 = 0.06;
pub const DRILL_UNFORCED_MIN: f32 = 0.005;
pub const DRILL_UNFORCED_MAX: f32 = 0.45;
pub const DRILL_FORCED_BASE: f32 = 0.30;
pub const DRILL_FORCED_MIN: f32 = 0.0;
pub const DRILL_FORCED_MAX: f32 = 0.60;
pub const DRILL_SPEED_WEIGHT: f32 = 0.45;
pub const DRILL_SPIN_WEIGHT: f32 = 0.25;
pub const DRILL_STRETCH_WEIGHT: f32 = 0.30;
pub const DRILL_RATING_CURVE: f32 = 0.35; // Exponent per rating point of advantage
pub const DRILL_RATING_FACTOR_MIN: f32 = 0.4;
pub const DRILL_RATING_FACTOR_MAX: f32 = 2.5;

pub const PRESSURE_DECAY: f32 = 0.7; // Pressure retained per shot
pub const PRESSURE_BASE_THRESHOLD: f32 = 1.2;
pub const PRESSURE_SKILL_THRESHOLD: f32 = 1.3; // Extra threshold at full clutch/focus
pub const PRESSURE_GAIN: f32 = 0.9; // Error multiplier slope above threshold

// =============================================================================
// SHOT MODES (human-like agent)
// =============================================================================

pub const MODE_POWER_UNLOCK: f32 = 0.55;
pub const MODE_TOPSPIN_UNLOCK: f32 = 0.50;
pub const MODE_SLICE_UNLOCK: f32 = 0.45;
pub const MODE_ANGLED_UNLOCK: f32 = 0.40;
pub const MODE_FOCUS_UNLOCK: f32 = 0.35;
pub const MODE_UNLOCK_CAP: f32 = 0.9;

// =============================================================================
// TRAINER TARGETS
// =============================================================================

pub const DUPR_POINTS_PER_RATING: f64 = 12.0;
pub const DUPR_MAX_DIFFERENTIAL: f64 = 10.5;
