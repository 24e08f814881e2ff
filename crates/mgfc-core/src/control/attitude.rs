//! Attitude controller
//!
//! Geometric attitude control on SO(3). Produces body moment commands from
//! the manifold errors and the inertial feedforward:
//!
//! M = −kr ∘ eR − kw ∘ eW + feedforward
//!
//! There is no persistent mode state: every call independently selects its
//! law from the command context. Yaw is either tracked as an attitude target
//! or, when no heading reference exists, substituted by rate control through
//! an explicit per-call [`YawCommand`] rather than by mutating shared gains.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::ControlError;
use crate::math::{
    attitude_error, euler_to_rotation, heading_angle, quaternion_to_rotation, rate_error,
    EulerAngles,
};
use crate::{Mat3, Vec3};

use super::inertia::{InertialFeedforward, NEWTON_METER_TO_GF_METER};

/// Attitude controller gains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttitudeGains {
    /// Attitude error gain per body axis [gf·m/rad]
    pub kr: Vec3,
    /// Rate error gain per body axis [gf·m·s/rad]
    pub kw: Vec3,
}

impl Default for AttitudeGains {
    fn default() -> Self {
        Self {
            kr: Vector3::new(300.0, 300.0, 0.0),
            kw: Vector3::new(46.25, 46.25, 2750.0),
        }
    }
}

/// Per-cycle yaw command
///
/// `Heading` tracks yaw as an attitude target. `Rate` disables the yaw
/// attitude gain for that cycle and feeds the commanded rate into the desired
/// angular velocity instead; the desired frame then follows the vehicle's
/// current heading so the roll/pitch targets stay heading-relative.
#[derive(Debug, Clone, Copy)]
pub enum YawCommand {
    /// Yaw attitude target [rad]
    Heading(f64),
    /// Yaw rate target [rad/s], used when no heading reference exists
    Rate(f64),
}

/// Moment command with the intermediate quantities telemetry reports
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentCommand {
    /// Commanded body moments [gf·m]
    pub moments: Vec3,
    /// Attitude error eR [rad]
    pub attitude_error: Vec3,
    /// Rate error eW [rad/s]
    pub rate_error: Vec3,
    /// Feedback part −kr∘eR − kw∘eW [gf·m]
    pub feedback: Vec3,
    /// Inertial feedforward part [gf·m]
    pub feedforward: Vec3,
}

/// Geometric attitude controller
#[derive(Debug, Clone)]
pub struct AttitudeController {
    /// Controller gains
    pub gains: AttitudeGains,
}

impl AttitudeController {
    pub fn new(gains: AttitudeGains) -> Self {
        Self { gains }
    }

    /// Manual attitude hold: desired orientation from the stick command
    ///
    /// Builds R from the measured quaternion and Rd from the commanded
    /// roll/pitch plus the yaw command, then applies the moment law with the
    /// hold-mode feedforward (desired rates zero except a commanded yaw
    /// rate).
    pub fn hold_moments(
        &self,
        attitude_q: &[f64; 4],
        gyro: &Vec3,
        roll: f64,
        pitch: f64,
        yaw: YawCommand,
        feedforward: &InertialFeedforward,
    ) -> Result<MomentCommand, ControlError> {
        let (r, rt) = quaternion_to_rotation(attitude_q)?;

        let (yaw_angle, kr, wd) = match yaw {
            YawCommand::Heading(psi) => (psi, self.gains.kr, Vec3::zeros()),
            YawCommand::Rate(rate) => {
                let mut kr = self.gains.kr;
                kr.z = 0.0;
                (heading_angle(&r), kr, Vector3::new(0.0, 0.0, rate))
            }
        };
        let (rd, rtd) = euler_to_rotation(&EulerAngles::new(roll, pitch, yaw_angle));

        let inertia_effect = feedforward.gyroscopic_moment(gyro) * NEWTON_METER_TO_GF_METER;
        Ok(self.moment_law(&kr, &r, &rt, &rd, &rtd, gyro, &wd, &inertia_effect))
    }

    /// Tracking delegate: desired orientation supplied by the position loop
    ///
    /// Desired rates are zero (no trajectory generator), so the feedforward
    /// reduces to the gyroscopic term.
    pub fn tracking_moments(
        &self,
        r: &Mat3,
        rt: &Mat3,
        rd: &Mat3,
        rtd: &Mat3,
        gyro: &Vec3,
        feedforward: &InertialFeedforward,
    ) -> MomentCommand {
        let inertia_effect = feedforward.gyroscopic_moment(gyro) * NEWTON_METER_TO_GF_METER;
        self.moment_law(
            &self.gains.kr,
            r,
            rt,
            rd,
            rtd,
            gyro,
            &Vec3::zeros(),
            &inertia_effect,
        )
    }

    /// Trajectory tracking with nonzero desired rates
    ///
    /// Carries the full inertial coupling term; required whenever a
    /// trajectory generator supplies Wd or Wd_dot.
    pub fn trajectory_moments(
        &self,
        r: &Mat3,
        rt: &Mat3,
        rd: &Mat3,
        rtd: &Mat3,
        gyro: &Vec3,
        wd: &Vec3,
        wd_dot: &Vec3,
        feedforward: &InertialFeedforward,
    ) -> MomentCommand {
        let inertia_effect =
            feedforward.trajectory_moment(gyro, rt, rd, wd, wd_dot) * NEWTON_METER_TO_GF_METER;
        self.moment_law(&self.gains.kr, r, rt, rd, rtd, gyro, wd, &inertia_effect)
    }

    #[allow(clippy::too_many_arguments)]
    fn moment_law(
        &self,
        kr: &Vec3,
        r: &Mat3,
        rt: &Mat3,
        rd: &Mat3,
        rtd: &Mat3,
        w: &Vec3,
        wd: &Vec3,
        inertia_effect: &Vec3,
    ) -> MomentCommand {
        let e_r = attitude_error(r, rt, rd, rtd);
        let e_w = rate_error(rt, rd, w, wd);

        let feedback = -kr.component_mul(&e_r) - self.gains.kw.component_mul(&e_w);

        MomentCommand {
            moments: feedback + inertia_effect,
            attitude_error: e_r,
            rate_error: e_w,
            feedback,
            feedforward: *inertia_effect,
        }
    }
}

impl Default for AttitudeController {
    fn default() -> Self {
        Self::new(AttitudeGains::default())
    }
}
