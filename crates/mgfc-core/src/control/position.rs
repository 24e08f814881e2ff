//! Position controller
//!
//! Outer tracking loop. Converts position/velocity error and desired
//! acceleration into a desired force vector:
//!
//! f = kp ∘ (p − pd) − kv ∘ (v − vd) − m g e3 + m ad
//!
//! and, in tracking mode, synthesizes the desired rotation matrix from the
//! force direction and the desired heading:
//!
//! b1d = (cos ψd, sin ψd, 0),  b3d = f / ‖f‖,  b2d = b3d × b1d,
//! Rd = [b1d | b2d | b3d]
//!
//! The collective thrust is the projection of the force onto the current
//! body thrust axis: force = −f · (R e3).

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::ControlError;
use crate::math::normalized;
use crate::{Mat3, Vec3, GRAVITY};

/// Position controller gains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionGains {
    /// Position error gain per world axis
    pub kp: Vec3,
    /// Velocity error gain per world axis
    pub kv: Vec3,
}

impl Default for PositionGains {
    fn default() -> Self {
        // The position loop ships disabled; tune per airframe before
        // enabling tracking flight.
        Self {
            kp: Vec3::zeros(),
            kv: Vec3::zeros(),
        }
    }
}

/// Geometric position controller
#[derive(Debug, Clone)]
pub struct PositionController {
    /// Controller gains
    pub gains: PositionGains,
    /// Vehicle mass [kg]
    pub mass: f64,
    /// Gravity magnitude [m/s²]
    pub gravity: f64,
}

impl PositionController {
    pub fn new(gains: PositionGains, mass: f64) -> Self {
        Self {
            gains,
            mass,
            gravity: GRAVITY,
        }
    }

    /// Desired force vector from tracking errors and feedforward acceleration
    ///
    /// At a hover setpoint this is exactly −m·g along e3.
    pub fn force_command(
        &self,
        pos: &Vec3,
        pos_d: &Vec3,
        vel: &Vec3,
        vel_d: &Vec3,
        accel_d: &Vec3,
    ) -> Vec3 {
        let pos_error = pos - pos_d;
        let vel_error = vel - vel_d;

        let mut f = self.gains.kp.component_mul(&pos_error)
            - self.gains.kv.component_mul(&vel_error)
            + self.mass * accel_d;
        f.z -= self.mass * self.gravity;
        f
    }

    /// Desired rotation (and transpose) from the force direction and heading
    ///
    /// Fails with [`ControlError::DegenerateVector`] when ‖f‖ is not bounded
    /// away from zero (zero net force leaves the thrust direction undefined).
    /// The caller substitutes the previous cycle's Rd in that case.
    pub fn desired_attitude(&self, f_ctrl: &Vec3, yaw_d: f64) -> Result<(Mat3, Mat3), ControlError> {
        let b3d = normalized(f_ctrl)?;
        let b1d = Vector3::new(yaw_d.cos(), yaw_d.sin(), 0.0);
        let b2d = b3d.cross(&b1d);

        let rd = Matrix3::from_columns(&[b1d, b2d, b3d]);
        Ok((rd, rd.transpose()))
    }

    /// Collective thrust: projection of the force onto the body thrust axis
    ///
    /// force = −f · (R e3); positive means increasing thrust.
    pub fn collective_force(&self, f_ctrl: &Vec3, r: &Mat3) -> f64 {
        let body_z = r * Vector3::new(0.0, 0.0, 1.0);
        -f_ctrl.dot(&body_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    fn tracking_gains() -> PositionGains {
        PositionGains {
            kp: Vector3::new(4.0, 4.0, 6.0),
            kv: Vector3::new(2.0, 2.0, 3.0),
        }
    }

    #[test]
    fn test_hover_force_is_weight() {
        let controller = PositionController::new(tracking_gains(), 1.0);
        let pos = Vector3::new(1.0, 2.0, 3.0);

        let f = controller.force_command(
            &pos,
            &pos,
            &Vector3::zeros(),
            &Vector3::zeros(),
            &Vector3::zeros(),
        );
        assert_relative_eq!(f, Vector3::new(0.0, 0.0, -9.8), epsilon = 1e-12);

        // Level attitude: collective thrust equals the weight
        let r = Matrix3::identity();
        assert_relative_eq!(controller.collective_force(&f, &r), 9.8, epsilon = 1e-12);
    }

    #[test]
    fn test_force_restores_toward_setpoint() {
        let controller = PositionController::new(tracking_gains(), 1.0);

        // Vehicle 1 m past the setpoint along x, drifting further
        let f = controller.force_command(
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::zeros(),
            &Vector3::new(0.5, 0.0, 0.0),
            &Vector3::zeros(),
            &Vector3::zeros(),
        );
        // kp·ex − kv·ev = 4.0 − 1.0
        assert_relative_eq!(f.x, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_acceleration_feedforward_scales_with_mass() {
        let controller = PositionController::new(PositionGains::default(), 2.0);
        let pos = Vector3::zeros();

        let f = controller.force_command(
            &pos,
            &pos,
            &Vector3::zeros(),
            &Vector3::zeros(),
            &Vector3::new(1.0, 0.0, 0.0),
        );
        assert_relative_eq!(f.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(f.z, -2.0 * 9.8, epsilon = 1e-12);
    }

    #[test]
    fn test_desired_attitude_is_orthonormal() {
        let controller = PositionController::new(tracking_gains(), 1.0);
        let f = Vector3::new(1.0, -2.0, -9.8);

        let (rd, rtd) = controller.desired_attitude(&f, 0.7).unwrap();
        assert_relative_eq!(rtd * rd, Matrix3::identity(), epsilon = 1e-10);
        assert_relative_eq!(rtd, rd.transpose(), epsilon = 1e-12);

        // Third column is the normalized force direction
        let b3d = rd.column(2).into_owned();
        assert_relative_eq!(b3d, f.normalize(), epsilon = 1e-12);
    }

    #[test]
    fn test_desired_attitude_heading_column() {
        let controller = PositionController::new(tracking_gains(), 1.0);
        let f = Vector3::new(0.0, 0.0, -9.8);
        let yaw = 0.3;

        let (rd, _) = controller.desired_attitude(&f, yaw).unwrap();
        let b1d = rd.column(0).into_owned();
        assert_relative_eq!(b1d, Vector3::new(yaw.cos(), yaw.sin(), 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_desired_attitude_rejects_zero_force() {
        let controller = PositionController::new(tracking_gains(), 1.0);
        let result = controller.desired_attitude(&Vector3::zeros(), 0.0);
        assert!(matches!(
            result,
            Err(ControlError::DegenerateVector { .. })
        ));
    }

    #[test]
    fn test_collective_force_projects_onto_body_axis() {
        let controller = PositionController::new(tracking_gains(), 1.0);
        let f = Vector3::new(0.0, 0.0, -9.8);

        // Vehicle rolled 90 degrees: thrust axis orthogonal to the force
        let (r, _) = crate::math::euler_to_rotation(&crate::math::EulerAngles::new(
            std::f64::consts::FRAC_PI_2,
            0.0,
            0.0,
        ));
        assert_relative_eq!(controller.collective_force(&f, &r), 0.0, epsilon = 1e-12);
    }
}
