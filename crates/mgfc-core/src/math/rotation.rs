//! SO(3) rotation utilities
//!
//! Rotation matrix construction from quaternions and Euler angles, the
//! hat/vee maps, and the manifold attitude/rate errors:
//!
//! eR = 1/2 vee(Rdᵀ R − Rᵀ Rd)
//! eW = W − (Rᵀ Rd) Wd
//!
//! Conversions return the matrix together with its transpose so each control
//! cycle computes the transpose once (an index swap) and reuses it.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::ControlError;
use crate::{Mat3, Vec3};

/// Accepted deviation of an attitude quaternion from unit norm
pub const UNIT_NORM_TOLERANCE: f64 = 1e-2;

/// Smallest vector norm accepted for normalization
pub const MIN_VECTOR_NORM: f64 = 1e-6;

/// Z-Y-X Euler attitude (roll, pitch, yaw) [rad]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl EulerAngles {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }
}

/// Skew-symmetric matrix from vector (hat map)
///
/// For v = [x, y, z]ᵀ:
/// ```text
/// [v]× = [ 0  -z   y]
///        [ z   0  -x]
///        [-y   x   0]
/// ```
///
/// so that hat(v) * x = v × x.
pub fn hat(v: &Vec3) -> Mat3 {
    Matrix3::new(
        0.0, -v.z, v.y,
        v.z, 0.0, -v.x,
        -v.y, v.x, 0.0,
    )
}

/// Vector from skew-symmetric matrix (vee map, inverse of [`hat`])
///
/// Reads the three independent off-diagonal entries only. The input must be
/// (near-)skew-symmetric; no symmetry check is performed.
pub fn vee(m: &Mat3) -> Vec3 {
    Vector3::new(m[(2, 1)], m[(0, 2)], m[(1, 0)])
}

/// Rotation matrix (and transpose) from a scalar-first unit quaternion
///
/// Fails with [`ControlError::InvalidAttitude`] when the quaternion is
/// non-finite or its norm deviates from one by more than
/// [`UNIT_NORM_TOLERANCE`]. Within the tolerance the quaternion is
/// renormalized before the closed-form expansion, so the returned matrix is
/// orthonormal up to floating-point error.
pub fn quaternion_to_rotation(q: &[f64; 4]) -> Result<(Mat3, Mat3), ControlError> {
    let norm = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    if !norm.is_finite() || (norm - 1.0).abs() > UNIT_NORM_TOLERANCE {
        return Err(ControlError::InvalidAttitude { norm });
    }

    let q0 = q[0] / norm;
    let q1 = q[1] / norm;
    let q2 = q[2] / norm;
    let q3 = q[3] / norm;

    let q1q1 = q1 * q1;
    let q2q2 = q2 * q2;
    let q3q3 = q3 * q3;
    let q1q2 = q1 * q2;
    let q0q2 = q0 * q2;
    let q0q3 = q0 * q3;
    let q1q3 = q1 * q3;
    let q2q3 = q2 * q3;
    let q0q1 = q0 * q1;

    let r = Matrix3::new(
        1.0 - 2.0 * (q2q2 + q3q3), 2.0 * (q1q2 - q0q3), 2.0 * (q1q3 + q0q2),
        2.0 * (q1q2 + q0q3), 1.0 - 2.0 * (q1q1 + q3q3), 2.0 * (q2q3 - q0q1),
        2.0 * (q1q3 - q0q2), 2.0 * (q0q1 + q2q3), 1.0 - 2.0 * (q1q1 + q2q2),
    );

    Ok((r, r.transpose()))
}

/// Rotation matrix (and transpose) from Z-Y-X Euler angles
///
/// R = Rz(yaw) · Ry(pitch) · Rx(roll)
pub fn euler_to_rotation(euler: &EulerAngles) -> (Mat3, Mat3) {
    let cos_phi = euler.roll.cos();
    let cos_theta = euler.pitch.cos();
    let cos_psi = euler.yaw.cos();
    let sin_phi = euler.roll.sin();
    let sin_theta = euler.pitch.sin();
    let sin_psi = euler.yaw.sin();

    let r = Matrix3::new(
        cos_theta * cos_psi,
        -cos_phi * sin_psi + sin_phi * sin_theta * cos_psi,
        sin_phi * sin_psi + cos_phi * sin_theta * cos_psi,
        cos_theta * sin_psi,
        cos_phi * cos_psi + sin_phi * sin_theta * sin_psi,
        -sin_phi * cos_psi + cos_phi * sin_theta * sin_psi,
        -sin_theta,
        sin_phi * cos_theta,
        cos_phi * cos_theta,
    );

    (r, r.transpose())
}

/// Heading angle extracted from a rotation matrix [rad]
///
/// Valid away from ±90° pitch, where the Z-Y-X yaw is undefined.
pub fn heading_angle(r: &Mat3) -> f64 {
    r[(1, 0)].atan2(r[(0, 0)])
}

/// Attitude error on the rotation manifold
///
/// eR = 1/2 vee(Rdᵀ R − Rᵀ Rd)
///
/// Zero exactly when R == Rd; no clamping is applied for large angles.
pub fn attitude_error(r: &Mat3, rt: &Mat3, rd: &Mat3, rtd: &Mat3) -> Vec3 {
    let e_r_mat = 0.5 * (rtd * r - rt * rd);
    vee(&e_r_mat)
}

/// Angular-rate error, with the desired rate rotated into the body frame
///
/// eW = W − (Rᵀ Rd) Wd
pub fn rate_error(rt: &Mat3, rd: &Mat3, w: &Vec3, wd: &Vec3) -> Vec3 {
    w - (rt * rd) * wd
}

/// Normalize a vector, failing instead of dividing by (near-)zero
///
/// Fails with [`ControlError::DegenerateVector`] when the norm is below
/// [`MIN_VECTOR_NORM`].
pub fn normalized(v: &Vec3) -> Result<Vec3, ControlError> {
    let norm = v.norm();
    if !norm.is_finite() || norm < MIN_VECTOR_NORM {
        return Err(ControlError::DegenerateVector {
            norm,
            min: MIN_VECTOR_NORM,
        });
    }
    Ok(v / norm)
}
