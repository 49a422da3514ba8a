//! Shared kinematic integration
//!
//! One pure function, [`integrate`], advances a player's kinematic state
//! by one input command. Prediction applies it immediately on input, and
//! reconciliation replays it over an authoritative snapshot; the two stay
//! consistent only because they call the exact same function, with the
//! same constants the authority is assumed to run.
//!
//! Replay runs only this integration, not world collision beyond the
//! ground plane. That is a documented simplification of the whole system.

use paredes_protocol::Vec3;
use serde::{Deserialize, Serialize};

use crate::InputCommand;

/// Base horizontal speed in units/s
pub const PLAYER_SPEED: f64 = 5.0;
/// Speed factor while sprinting with stamina available
pub const SPRINT_MULTIPLIER: f64 = 1.5;
/// Upward velocity applied on jump
pub const JUMP_FORCE: f64 = 10.0;
/// Downward acceleration while airborne, units/s²
pub const GRAVITY: f64 = 20.0;
/// Per-step horizontal velocity retention when there is no movement intent
pub const FRICTION: f64 = 0.9;
/// Ground plane height
pub const GROUND_Y: f64 = 1.0;

/// Stamina cap
pub const STAMINA_MAX: f64 = 100.0;
/// Stamina drain per second while sprinting
pub const STAMINA_SPRINT_COST: f64 = 20.0;
/// Stamina recovery per second otherwise
pub const STAMINA_RECOVERY_RATE: f64 = 10.0;
/// Health cap
pub const HEALTH_MAX: f64 = 100.0;

/// Horizontal velocity below this magnitude is zeroed under friction
const VELOCITY_EPSILON: f64 = 0.01;
/// Small downward velocity while grounded, keeps ground contact
const GROUND_STICK: f64 = -0.1;

/// Tunables for the integration rule
///
/// Defaults match the game constants above. The authority must run the
/// same values or prediction diverges every frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MovementConfig {
    pub speed: f64,
    pub sprint_multiplier: f64,
    pub jump_force: f64,
    pub gravity: f64,
    pub friction: f64,
    pub ground_y: f64,
    pub stamina_sprint_cost: f64,
    pub stamina_recovery_rate: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            sprint_multiplier: SPRINT_MULTIPLIER,
            jump_force: JUMP_FORCE,
            gravity: GRAVITY,
            friction: FRICTION,
            ground_y: GROUND_Y,
            stamina_sprint_cost: STAMINA_SPRINT_COST,
            stamina_recovery_rate: STAMINA_RECOVERY_RATE,
        }
    }
}

/// Kinematic state of a player entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Yaw in radians; driven by the look controls, not by input commands
    pub yaw: f64,
    pub health: f64,
    pub stamina: f64,
    pub grounded: bool,
}

impl KinematicState {
    /// Fresh state standing at `position` with full pools
    pub fn spawn(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            health: HEALTH_MAX,
            stamina: STAMINA_MAX,
            grounded: true,
        }
    }
}

impl Default for KinematicState {
    fn default() -> Self {
        Self::spawn(Vec3::new(0.0, GROUND_Y, 0.0))
    }
}

/// Advance `state` by one input command
///
/// Deterministic: identical state + input + config always produce the
/// identical result, on the client and on the authority.
pub fn integrate(state: &mut KinematicState, input: &InputCommand, config: &MovementConfig) {
    let dt = input.delta_time;

    // Gravity uses the grounded flag from before this frame's jump
    if state.grounded {
        state.velocity.y = GROUND_STICK;
    } else {
        state.velocity.y -= config.gravity * dt;
    }

    let sprinting = input.sprint && state.stamina > 0.0;
    let speed = if sprinting {
        config.speed * config.sprint_multiplier
    } else {
        config.speed
    };

    let intent = input.movement.clamped();
    if intent.is_none() {
        state.velocity.x *= config.friction;
        state.velocity.z *= config.friction;
        if state.velocity.x.abs() < VELOCITY_EPSILON {
            state.velocity.x = 0.0;
        }
        if state.velocity.z.abs() < VELOCITY_EPSILON {
            state.velocity.z = 0.0;
        }
    } else {
        state.velocity.x = intent.x * speed;
        state.velocity.z = intent.z * speed;
    }

    if input.jump && state.grounded {
        state.velocity.y = config.jump_force;
        state.grounded = false;
    }

    state.position.x += state.velocity.x * dt;
    state.position.y += state.velocity.y * dt;
    state.position.z += state.velocity.z * dt;

    if state.position.y < config.ground_y {
        state.position.y = config.ground_y;
        state.velocity.y = 0.0;
        state.grounded = true;
    } else {
        state.grounded = false;
    }

    if sprinting {
        state.stamina = (state.stamina - config.stamina_sprint_cost * dt).max(0.0);
    } else {
        state.stamina = (state.stamina + config.stamina_recovery_rate * dt).min(STAMINA_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paredes_protocol::Movement;

    fn input(movement: Movement, jump: bool, sprint: bool, dt: f64) -> InputCommand {
        InputCommand {
            sequence: 1,
            movement,
            jump,
            sprint,
            delta_time: dt,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_basic_movement() {
        let mut state = KinematicState::default();
        integrate(
            &mut state,
            &input(Movement::new(1.0, 0.0), false, false, 0.1),
            &MovementConfig::default(),
        );
        assert!((state.position.x - PLAYER_SPEED * 0.1).abs() < 1e-12);
        assert_eq!(state.position.y, GROUND_Y);
        assert!(state.grounded);
    }

    #[test]
    fn test_diagonal_not_faster() {
        let config = MovementConfig::default();
        let mut straight = KinematicState::default();
        let mut diagonal = KinematicState::default();

        integrate(
            &mut straight,
            &input(Movement::new(1.0, 0.0), false, false, 1.0),
            &config,
        );
        integrate(
            &mut diagonal,
            &input(Movement::new(1.0, 1.0), false, false, 1.0),
            &config,
        );

        let straight_dist = straight.position.x;
        let diag_dist = (diagonal.position.x.powi(2) + diagonal.position.z.powi(2)).sqrt();
        assert!((straight_dist - diag_dist).abs() < 1e-9);
    }

    #[test]
    fn test_sprint_gated_on_stamina() {
        let config = MovementConfig::default();

        let mut fresh = KinematicState::default();
        integrate(
            &mut fresh,
            &input(Movement::new(1.0, 0.0), false, true, 1.0),
            &config,
        );
        assert!((fresh.position.x - PLAYER_SPEED * SPRINT_MULTIPLIER).abs() < 1e-12);
        assert_eq!(fresh.stamina, STAMINA_MAX - STAMINA_SPRINT_COST);

        let mut exhausted = KinematicState {
            stamina: 0.0,
            ..KinematicState::default()
        };
        integrate(
            &mut exhausted,
            &input(Movement::new(1.0, 0.0), false, true, 1.0),
            &config,
        );
        // No stamina: normal speed, and the pool recovers instead
        assert!((exhausted.position.x - PLAYER_SPEED).abs() < 1e-12);
        assert_eq!(exhausted.stamina, STAMINA_RECOVERY_RATE);
    }

    #[test]
    fn test_jump_and_landing() {
        let config = MovementConfig::default();
        let mut state = KinematicState::default();

        integrate(&mut state, &input(Movement::NONE, true, false, 0.1), &config);
        assert!(!state.grounded);
        assert!(state.position.y > GROUND_Y);

        // Jump input while airborne is ignored
        let apex_vy = state.velocity.y;
        integrate(&mut state, &input(Movement::NONE, true, false, 0.1), &config);
        assert!(state.velocity.y < apex_vy);

        // Integrate until landing
        for _ in 0..100 {
            integrate(&mut state, &input(Movement::NONE, false, false, 0.1), &config);
            if state.grounded {
                break;
            }
        }
        assert!(state.grounded);
        assert_eq!(state.position.y, GROUND_Y);
        assert_eq!(state.velocity.y, 0.0);
    }

    #[test]
    fn test_friction_stops_idle_movement() {
        let config = MovementConfig::default();
        let mut state = KinematicState::default();
        state.velocity.x = 1.0;

        for _ in 0..100 {
            integrate(&mut state, &input(Movement::NONE, false, false, 0.016), &config);
        }
        assert_eq!(state.velocity.x, 0.0);
    }

    #[test]
    fn test_determinism() {
        let config = MovementConfig::default();
        let cmd = input(Movement::new(0.5, -1.0), true, true, 0.016);

        let mut a = KinematicState::default();
        let mut b = KinematicState::default();
        for _ in 0..50 {
            integrate(&mut a, &cmd, &config);
            integrate(&mut b, &cmd, &config);
        }
        assert_eq!(a, b);
    }
}
