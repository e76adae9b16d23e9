//! Fixed-step two-phase integrator
//!
//! One step is a velocity phase over every body followed by a position phase
//! over every body. The live universe and the trajectory predictor both step
//! through [`two_phase_step`], so live and predicted motion agree.

use tracing::trace;

use crate::simulation::error::SimError;
use crate::simulation::orbital::Orbital;
use crate::simulation::states::{BodyId, NVec3, Peer};

/// A body together with the id it is known by
#[derive(Debug, Clone)]
pub struct Slot<O> {
    pub id: BodyId,
    pub body: O,
}

/// Advance every body in `slots` by one step.
///
/// - Velocity phase: all accelerations are computed against one frozen list
///   of pre-step positions, so the result does not depend on slot order.
/// - Position phase: x += v * dt with each body's finalized velocity.
///
/// Accelerations are all evaluated before anything is written. If any of
/// them fails the step is aborted and no body has been touched.
///
/// Returns the new position of every body, in slot order.
pub fn two_phase_step<O: Orbital>(slots: &mut [Slot<O>]) -> Result<Vec<(BodyId, NVec3)>, SimError> {
    let n = slots.len();
    if n == 0 { // no bodies, nothing to do
        return Ok(Vec::new());
    }

    // frozen pre-step view shared by every body
    let peers: Vec<Peer> = slots.iter().map(|s| s.body.as_peer(s.id)).collect();

    let mut accels = Vec::with_capacity(n);
    for slot in slots.iter() {
        accels.push(slot.body.compute_acceleration(slot.id, &peers)?);
    }

    // Kick: v_n+1 = v_n + dt * a_n
    for (slot, acc) in slots.iter_mut().zip(accels) {
        slot.body.apply_acceleration(acc);
    }

    // Drift: x_n+1 = x_n + dt * v_n+1
    let positions: Vec<(BodyId, NVec3)> = slots
        .iter_mut()
        .map(|slot| (slot.id, slot.body.update_location()))
        .collect();

    trace!(bodies = n, "two-phase step complete");
    Ok(positions)
}
