//! Thrust allocation
//!
//! Maps commanded body moments and the collective force basis into four
//! individual motor forces for an X-configuration quadrotor, converts each
//! force to a normalized actuator command, and scales into the bounded PWM
//! pulse range. Clamping at the pulse limits is silent saturation, the
//! designed actuator-limit behavior, never an error.

use serde::{Deserialize, Serialize};

use crate::Vec3;

/// Mixer geometry and output limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixerParams {
    /// Motor-to-center-of-gravity arm length [m]
    pub arm_length: f64,
    /// Yaw moment coefficient of the propeller set
    pub yaw_coefficient: f64,
    /// PWM pulse width at zero command [µs]
    pub pulse_min: u16,
    /// PWM pulse width at full command [µs]
    pub pulse_max: u16,
    /// Maximum static thrust of one motor, in the force unit of the mixer
    pub max_thrust: f64,
}

impl Default for MixerParams {
    fn default() -> Self {
        Self {
            arm_length: 0.1625,
            yaw_coefficient: 1.0,
            pulse_min: 1000,
            pulse_max: 2000,
            max_thrust: 600.0,
        }
    }
}

/// Monotonic thrust-to-command conversion
///
/// Implemented by the motor characterization layer; maps a single-motor
/// thrust demand onto a normalized command in [0, 1]. Values outside the
/// characterized range may map outside [0, 1]; the allocator saturates at
/// the pulse limits afterwards.
pub trait ThrustCurve {
    fn thrust_to_command(&self, thrust: f64) -> f64;
}

/// Linear curve calibrated by the motor's maximum static thrust
#[derive(Debug, Clone)]
pub struct LinearThrustCurve {
    pub max_thrust: f64,
}

impl ThrustCurve for LinearThrustCurve {
    fn thrust_to_command(&self, thrust: f64) -> f64 {
        thrust / self.max_thrust
    }
}

/// Thrust allocator for an X-configuration quadrotor
///
/// Motor order and moment sign pattern are fixed by the hardware layout:
/// front-right, rear-right, rear-left, front-left.
#[derive(Debug, Clone)]
pub struct ThrustAllocator<C = LinearThrustCurve> {
    params: MixerParams,
    curve: C,
}

impl ThrustAllocator<LinearThrustCurve> {
    /// Allocator with the linear curve derived from the mixer parameters
    pub fn new(params: MixerParams) -> Self {
        let curve = LinearThrustCurve {
            max_thrust: params.max_thrust,
        };
        Self { params, curve }
    }
}

impl<C: ThrustCurve> ThrustAllocator<C> {
    /// Allocator with an externally characterized thrust curve
    pub fn with_curve(params: MixerParams, curve: C) -> Self {
        Self { params, curve }
    }

    /// Per-motor forces from body moments and the collective force basis
    ///
    /// With zero moments all four forces equal the basis (hover symmetry).
    pub fn motor_forces(&self, moments: &Vec3, force_basis: f64) -> [f64; 4] {
        let l = 0.25 / self.params.arm_length;
        let b = 0.25 / self.params.yaw_coefficient;

        [
            l * moments.x + l * moments.y + b * moments.z + force_basis,
            -l * moments.x + l * moments.y - b * moments.z + force_basis,
            -l * moments.x - l * moments.y + b * moments.z + force_basis,
            l * moments.x - l * moments.y - b * moments.z + force_basis,
        ]
    }

    /// Bounded PWM pulse widths from body moments and the force basis
    pub fn allocate(&self, moments: &Vec3, force_basis: f64) -> [u16; 4] {
        let span = f64::from(self.params.pulse_max - self.params.pulse_min);
        let min = f64::from(self.params.pulse_min);
        let max = f64::from(self.params.pulse_max);

        self.motor_forces(moments, force_basis).map(|force| {
            let pulse = self.curve.thrust_to_command(force) * span + min;
            pulse.clamp(min, max) as u16
        })
    }

    /// Halt pulse widths for the disarmed state
    pub fn halt(&self) -> [u16; 4] {
        [self.params.pulse_min; 4]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn allocator() -> ThrustAllocator {
        ThrustAllocator::new(MixerParams::default())
    }

    #[test]
    fn test_hover_symmetry() {
        let forces = allocator().motor_forces(&Vector3::zeros(), 250.0);
        for force in forces {
            assert_relative_eq!(force, 250.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_mixing_recovers_moments() {
        let params = MixerParams::default();
        let moments = Vector3::new(12.0, -7.5, 3.0);
        let f = allocator().motor_forces(&moments, 100.0);

        let l = params.arm_length;
        let b = params.yaw_coefficient;
        assert_relative_eq!(l * (f[0] - f[1] - f[2] + f[3]), moments.x, epsilon = 1e-9);
        assert_relative_eq!(l * (f[0] + f[1] - f[2] - f[3]), moments.y, epsilon = 1e-9);
        assert_relative_eq!(b * (f[0] - f[1] + f[2] - f[3]), moments.z, epsilon = 1e-9);
        assert_relative_eq!(0.25 * (f[0] + f[1] + f[2] + f[3]), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pulses_always_within_bounds() {
        let allocator = allocator();
        let extremes = [
            (Vector3::new(1e6, -1e6, 1e6), 0.0),
            (Vector3::new(-1e9, 1e9, -1e9), 1e9),
            (Vector3::zeros(), -1e6),
            (Vector3::zeros(), 1e12),
        ];
        for (moments, basis) in extremes {
            for pulse in allocator.allocate(&moments, basis) {
                assert!((1000..=2000).contains(&pulse));
            }
        }
    }

    #[test]
    fn test_hover_pulse_midpoint() {
        // Basis at half the motor's maximum thrust lands mid-range
        let pulses = allocator().allocate(&Vector3::zeros(), 300.0);
        for pulse in pulses {
            assert_eq!(pulse, 1500);
        }
    }

    #[test]
    fn test_halt_outputs_minimum_pulse() {
        assert_eq!(allocator().halt(), [1000; 4]);
    }

    #[test]
    fn test_yaw_moment_splits_diagonals() {
        // Positive yaw moment raises the front-right/rear-left pair
        let f = allocator().motor_forces(&Vector3::new(0.0, 0.0, 8.0), 100.0);
        assert!(f[0] > 100.0 && f[2] > 100.0);
        assert!(f[1] < 100.0 && f[3] < 100.0);
        assert_relative_eq!(f[0], f[2], epsilon = 1e-12);
        assert_relative_eq!(f[1], f[3], epsilon = 1e-12);
    }
}
