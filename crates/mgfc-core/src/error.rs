//! Control error taxonomy
//!
//! Math utilities surface these to their caller instead of letting NaN or Inf
//! flow toward the actuators. The per-cycle control loop catches them and
//! substitutes a safe output; none of them is ever fatal.

use thiserror::Error;

/// Errors raised by the control and math layers
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ControlError {
    /// Attitude quaternion is non-finite or too far from unit norm
    #[error("invalid attitude quaternion (norm {norm})")]
    InvalidAttitude { norm: f64 },

    /// A measurement or command contains NaN or Inf
    #[error("non-finite {quantity} input")]
    NonFiniteInput { quantity: &'static str },

    /// A vector used as a divisor is within epsilon of zero
    #[error("degenerate vector (norm {norm} below {min})")]
    DegenerateVector { norm: f64, min: f64 },
}
