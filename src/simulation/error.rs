//! Error type shared by the simulation kernel, registry and predictor

use thiserror::Error;

use crate::simulation::states::BodyId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid constant `{name}`: {value}")]
    InvalidConstant { name: &'static str, value: f64 },

    #[error("body mass must be positive and finite, got {0}")]
    InvalidMass(f64),

    #[error("non-finite {0} in body state")]
    NonFiniteInput(&'static str),

    #[error("non-finite state on body {0}")]
    NonFiniteState(BodyId),

    #[error("bodies {body} and {other} occupy the same position")]
    CoincidentBodies { body: BodyId, other: BodyId },

    #[error("body is not attached to a universe")]
    Detached,

    #[error("unknown body {0}")]
    UnknownBody(BodyId),
}
