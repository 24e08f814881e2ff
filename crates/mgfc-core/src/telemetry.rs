//! Telemetry values
//!
//! Named scalar fields exposed for the external debug-link packetizer. The
//! core imposes no wire format; it only keeps these records current after
//! each control cycle.

use serde::{Deserialize, Serialize};

use crate::control::{DynamicsEstimate, MomentCommand, GF_METER_TO_NEWTON_METER};
use crate::Vec3;

/// Geometric controller debug frame
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GeometryDebug {
    /// Attitude error eR [deg]
    pub attitude_error_deg: Vec3,
    /// Rate error eW [deg/s]
    pub rate_error_deg: Vec3,
    /// Feedback moments [N·m]
    pub feedback_moments: Vec3,
    /// Feedforward (inertia effect) moments [gf·m]
    pub feedforward_moments: Vec3,
}

impl From<&MomentCommand> for GeometryDebug {
    fn from(command: &MomentCommand) -> Self {
        Self {
            attitude_error_deg: command.attitude_error.map(f64::to_degrees),
            rate_error_deg: command.rate_error.map(f64::to_degrees),
            feedback_moments: command.feedback * GF_METER_TO_NEWTON_METER,
            feedforward_moments: command.feedforward,
        }
    }
}

/// Rigid-body dynamics debug frame
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DynamicsDebug {
    /// Estimated total moment J ω̇ + ω × J ω [N·m]
    pub total_moment: Vec3,
    /// Rotating-frame moment J ω̇ [N·m]
    pub rotational_moment: Vec3,
}

impl From<DynamicsEstimate> for DynamicsDebug {
    fn from(estimate: DynamicsEstimate) -> Self {
        Self {
            total_moment: estimate.total,
            rotational_moment: estimate.rotational,
        }
    }
}
