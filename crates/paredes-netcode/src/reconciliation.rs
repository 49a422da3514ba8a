//! Server reconciliation
//!
//! Corrects the predicted local state when an authoritative snapshot
//! disagrees with it. Divergence within tolerance keeps the predicted
//! position and only adopts the authoritative health and stamina pools;
//! divergence beyond tolerance snaps to the authoritative position and
//! replays every still-pending input to fast-forward back to "now".
//!
//! Divergence is an expected correction path, not an error.

use paredes_protocol::{PlayerSnapshot, Vec3};

use crate::Predictor;

/// Divergence at or below this distance accepts the prediction
pub const PREDICTION_TOLERANCE: f64 = 0.5;

/// Authoritative view of the local player, extracted from `game_state`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthoritativeState {
    pub position: Vec3,
    pub health: f64,
    pub stamina: f64,
    /// Highest input sequence the authority reports having processed
    pub last_processed_input: Option<u64>,
}

impl From<&PlayerSnapshot> for AuthoritativeState {
    fn from(snapshot: &PlayerSnapshot) -> Self {
        Self {
            position: snapshot.position,
            health: snapshot.health,
            stamina: snapshot.stamina,
            last_processed_input: snapshot.last_processed_input,
        }
    }
}

/// What reconciliation did with a snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReconcileOutcome {
    /// Divergence within tolerance; predicted position kept
    Accepted { divergence: f64 },
    /// Snapped to the authoritative position and replayed pending inputs
    Snapped {
        divergence: f64,
        replayed_inputs: usize,
    },
}

/// Reconcile the predictor against an authoritative snapshot
///
/// Tolerance comparison is `<=`: exactly at the boundary the prediction
/// is accepted. With an empty pending queue a snap takes the
/// authoritative position verbatim.
pub fn reconcile(predictor: &mut Predictor, auth: &AuthoritativeState) -> ReconcileOutcome {
    reconcile_with_tolerance(predictor, auth, PREDICTION_TOLERANCE)
}

/// Reconcile with an explicit tolerance
pub fn reconcile_with_tolerance(
    predictor: &mut Predictor,
    auth: &AuthoritativeState,
    tolerance: f64,
) -> ReconcileOutcome {
    // The snapshot acknowledges everything the authority has processed
    if let Some(sequence) = auth.last_processed_input {
        predictor.acknowledge(sequence);
    }

    let divergence = predictor.state().position.distance(&auth.position);

    let outcome = if divergence <= tolerance {
        ReconcileOutcome::Accepted { divergence }
    } else {
        let replayed_inputs = predictor.pending().len();
        tracing::debug!(
            divergence,
            replayed_inputs,
            "prediction diverged, snapping to authoritative position"
        );
        predictor.state_mut().position = auth.position;
        predictor.replay_pending();
        ReconcileOutcome::Snapped {
            divergence,
            replayed_inputs,
        }
    };

    // Pools are always authoritative, whichever branch ran
    predictor.state_mut().health = auth.health;
    predictor.state_mut().stamina = auth.stamina;

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::tests::test_predictor;
    use paredes_protocol::Movement;

    fn auth(position: Vec3, last_processed_input: Option<u64>) -> AuthoritativeState {
        AuthoritativeState {
            position,
            health: 90.0,
            stamina: 60.0,
            last_processed_input,
        }
    }

    #[test]
    fn test_agreement_keeps_prediction() {
        // Predict (0,0,0) -> (1,0,0) for seq 1 at dx=1, dt=1, speed=1
        let mut predictor = test_predictor();
        predictor
            .apply_input(Movement::new(1.0, 0.0), false, false, 1.0, 0.0)
            .unwrap();

        // Authority agrees: (1,0,0) with seq 1 processed
        let outcome = reconcile(&mut predictor, &auth(Vec3::new(1.0, 0.0, 0.0), Some(1)));

        match outcome {
            ReconcileOutcome::Accepted { divergence } => assert!(divergence < 1e-9),
            other => panic!("expected accept, got {other:?}"),
        }
        assert_eq!(predictor.state().position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(predictor.state().health, 90.0);
        assert_eq!(predictor.state().stamina, 60.0);
        assert!(predictor.pending().is_empty());
    }

    #[test]
    fn test_divergence_snaps_and_replays() {
        // Predict seq 1 and 2 at dx=1, dt=1; authority processed only seq 1
        // and reports (5,0,0) against our predicted (2,0,0)
        let mut predictor = test_predictor();
        predictor
            .apply_input(Movement::new(1.0, 0.0), false, false, 1.0, 0.0)
            .unwrap();
        predictor
            .apply_input(Movement::new(1.0, 0.0), false, false, 1.0, 0.0)
            .unwrap();

        let outcome = reconcile(&mut predictor, &auth(Vec3::new(5.0, 0.0, 0.0), Some(1)));

        match outcome {
            ReconcileOutcome::Snapped {
                divergence,
                replayed_inputs,
            } => {
                assert!(divergence > PREDICTION_TOLERANCE);
                assert_eq!(replayed_inputs, 1);
            }
            other => panic!("expected snap, got {other:?}"),
        }
        // Snapped to (5,0,0), then seq 2 replayed to (6,0,0)
        assert_eq!(predictor.state().position, Vec3::new(6.0, 0.0, 0.0));
    }

    #[test]
    fn test_tolerance_boundary_accepts() {
        let tolerance = 0.5;

        // Exactly at tolerance: accept
        let mut at_boundary = test_predictor();
        let outcome = reconcile_with_tolerance(
            &mut at_boundary,
            &auth(Vec3::new(tolerance, 0.0, 0.0), None),
            tolerance,
        );
        assert!(matches!(outcome, ReconcileOutcome::Accepted { .. }));
        assert_eq!(at_boundary.state().position, Vec3::ZERO);

        // Just past tolerance: snap
        let mut past_boundary = test_predictor();
        let outcome = reconcile_with_tolerance(
            &mut past_boundary,
            &auth(Vec3::new(tolerance + 1e-6, 0.0, 0.0), None),
            tolerance,
        );
        assert!(matches!(outcome, ReconcileOutcome::Snapped { .. }));
        assert_eq!(
            past_boundary.state().position,
            Vec3::new(tolerance + 1e-6, 0.0, 0.0)
        );
    }

    #[test]
    fn test_empty_queue_takes_position_verbatim() {
        let mut predictor = test_predictor();
        let outcome = reconcile(&mut predictor, &auth(Vec3::new(8.0, 0.0, -3.0), None));

        match outcome {
            ReconcileOutcome::Snapped {
                replayed_inputs, ..
            } => assert_eq!(replayed_inputs, 0),
            other => panic!("expected snap, got {other:?}"),
        }
        assert_eq!(predictor.state().position, Vec3::new(8.0, 0.0, -3.0));
    }

    #[test]
    fn test_snapshot_without_ack_preserves_queue() {
        let mut predictor = test_predictor();
        predictor
            .apply_input(Movement::new(1.0, 0.0), false, false, 1.0, 0.0)
            .unwrap();

        reconcile(&mut predictor, &auth(Vec3::new(1.0, 0.0, 0.0), None));
        assert_eq!(predictor.pending().len(), 1);
    }
}
