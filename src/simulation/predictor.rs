//! Offline trajectory prediction
//!
//! The predictor runs the same two-phase step as the live universe, but on a
//! [`Snapshot`]: independent copies of the bodies that are never registered
//! anywhere. Each body's post-step positions are recorded and, when a
//! reference body is chosen, rebased into that body's initial frame.
//!
//! Rebasing for step `i`:
//!
//! ```text
//! offset_i = ref_before_step_i - ref_initial
//! sample_i = position_after_step_i - offset_i
//! ```
//!
//! The reference body's own samples are pinned to `ref_initial`.

use tracing::debug;

use crate::simulation::error::SimError;
use crate::simulation::integrator::{two_phase_step, Slot};
use crate::simulation::orbital::Orbital;
use crate::simulation::params::SimulationConstants;
use crate::simulation::states::{Body, BodyId, NVec3};

/// Transient copies of bodies, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    slots: Vec<Slot<Body>>,
    next_id: u64,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a body under a fresh id
    pub fn insert(&mut self, body: Body) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot { id, body });
        id
    }

    /// Add a body under the id it has elsewhere (e.g. in a live universe)
    pub(crate) fn insert_with_id(&mut self, id: BodyId, body: Body) {
        self.next_id = self.next_id.max(id.0 + 1);
        self.slots.push(Slot { id, body });
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.slots.iter().find(|s| s.id == id).map(|s| &s.body)
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.slots.iter().map(|s| s.id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl FromIterator<Body> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Body>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for body in iter {
            snapshot.insert(body);
        }
        snapshot
    }
}

/// Recorded positions of one body, one sample per step
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub id: BodyId,
    pub samples: Vec<NVec3>,
}

impl Trajectory {
    /// Consecutive sample pairs, i.e. the segments of the display polyline
    pub fn segments(&self) -> impl Iterator<Item = (NVec3, NVec3)> + '_ {
        self.samples.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn last(&self) -> Option<NVec3> {
        self.samples.last().copied()
    }
}

/// Output of one prediction run, owned by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectories {
    tracks: Vec<Trajectory>,
    reference: Option<BodyId>,
    steps: usize,
}

impl Trajectories {
    pub fn get(&self, id: BodyId) -> Option<&Trajectory> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trajectory> {
        self.tracks.iter()
    }

    pub fn reference(&self) -> Option<BodyId> {
        self.reference
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrajectoryPredictor {
    steps: usize,
    reference: Option<BodyId>,
}

impl TrajectoryPredictor {
    pub fn new(steps: usize) -> Self {
        Self {
            steps,
            reference: None,
        }
    }

    /// Rebase every sample into `reference`'s initial frame
    pub fn relative_to(self, reference: Option<BodyId>) -> Self {
        Self { reference, ..self }
    }

    /// Run `steps` steps over the snapshot and collect a trajectory per body.
    ///
    /// The snapshot is consumed; its bodies do not outlive the call. On error
    /// no partial trajectories are returned.
    pub fn predict(&self, snapshot: Snapshot) -> Result<Trajectories, SimError> {
        let mut slots = snapshot.slots;

        let reference_index = match self.reference {
            Some(id) => Some(
                slots
                    .iter()
                    .position(|s| s.id == id)
                    .ok_or(SimError::UnknownBody(id))?,
            ),
            None => None,
        };

        debug!(
            bodies = slots.len(),
            steps = self.steps,
            reference = ?self.reference,
            "predicting trajectories"
        );

        let reference_initial = reference_position(&slots, reference_index);
        let mut tracks: Vec<Trajectory> = slots
            .iter()
            .map(|s| Trajectory {
                id: s.id,
                samples: Vec::with_capacity(self.steps),
            })
            .collect();

        for _ in 0..self.steps {
            // where the reference was before this step
            let reference_current = reference_position(&slots, reference_index);
            let offset = reference_current - reference_initial;

            let positions = two_phase_step(&mut slots)?;

            for (i, (track, (_, position))) in tracks.iter_mut().zip(positions).enumerate() {
                let sample = if reference_index == Some(i) {
                    reference_initial // pinned
                } else {
                    position - offset
                };
                track.samples.push(sample);
            }
        }

        debug!(steps = self.steps, "prediction finished");
        Ok(Trajectories {
            tracks,
            reference: self.reference,
            steps: self.steps,
        })
    }
}

// zero when no reference body is set
fn reference_position(slots: &[Slot<Body>], index: Option<usize>) -> NVec3 {
    index.map_or(NVec3::zeros(), |i| slots[i].body.position())
}

/// Snapshot every body of a registry with `constants`
pub(crate) fn snapshot_of<'a, O, I>(bodies: I, constants: SimulationConstants) -> Result<Snapshot, SimError>
where
    O: Orbital + ?Sized + 'a,
    I: IntoIterator<Item = (BodyId, &'a O)>,
{
    let mut snapshot = Snapshot::new();
    for (id, body) in bodies {
        snapshot.insert_with_id(id, body.snapshot(constants)?);
    }
    Ok(snapshot)
}
