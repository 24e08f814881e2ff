//! Inertial feedforward
//!
//! Rigid-body moment terms computed from the inertia tensor and the measured
//! angular velocity:
//!
//! gyroscopic   = W × (J W)
//! coupling     = J [(ŵ Rᵀ Rd Wd) − (Rᵀ Rd Wd_dot)]
//! feedforward  = gyroscopic − coupling
//!
//! The coupling term vanishes exactly when Wd = Wd_dot = 0, so the
//! attitude-hold path uses [`InertialFeedforward::gyroscopic_moment`] alone;
//! [`InertialFeedforward::trajectory_moment`] carries the full expression for
//! use whenever a trajectory generator supplies nonzero desired rates.
//!
//! The instance also owns the filtered angular-acceleration state used by the
//! rigid-body moment estimate reported over telemetry.

use crate::math::hat;
use crate::{Mat3, Vec3};

/// Scale from SI moments [N·m] into the gram-force·metre unit the moment
/// gains are tuned in (1 N·m = 1000/9.8 gf·m)
pub const NEWTON_METER_TO_GF_METER: f64 = 101.97;

/// Inverse of [`NEWTON_METER_TO_GF_METER`], used when reporting moments in SI
pub const GF_METER_TO_NEWTON_METER: f64 = 0.0098;

/// Smoothing factor of the angular-acceleration low-pass filter
const ACCEL_FILTER_GAIN: f64 = 0.01;

/// First-order low-pass filter with a fixed smoothing factor
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    gain: f64,
    value: Vec3,
}

impl LowPassFilter {
    pub fn new(gain: f64) -> Self {
        Self {
            gain,
            value: Vec3::zeros(),
        }
    }

    /// Update with a new sample and return the filtered value
    pub fn update(&mut self, sample: &Vec3) -> Vec3 {
        self.value += self.gain * (sample - self.value);
        self.value
    }

    /// Current filtered value
    pub fn value(&self) -> Vec3 {
        self.value
    }

    /// Reset filter state
    pub fn reset(&mut self, value: Vec3) {
        self.value = value;
    }
}

/// Rigid-body moment estimate split into its components [N·m]
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicsEstimate {
    /// Total moment J ω̇ + ω × J ω
    pub total: Vec3,
    /// Rotating-frame contribution J ω̇ alone
    pub rotational: Vec3,
}

/// Inertial feedforward with explicit filter state
///
/// Owns the previous gyro sample and the low-pass filter used to estimate
/// angular acceleration across cycles. Construct one instance per controller;
/// all other quantities are pure functions of the call arguments.
#[derive(Debug, Clone)]
pub struct InertialFeedforward {
    inertia: Mat3,
    dt: f64,
    prev_gyro: Vec3,
    accel_filter: LowPassFilter,
}

impl InertialFeedforward {
    /// Create from the body inertia tensor and the control period [s]
    pub fn new(inertia: Mat3, dt: f64) -> Self {
        Self {
            inertia,
            dt,
            prev_gyro: Vec3::zeros(),
            accel_filter: LowPassFilter::new(ACCEL_FILTER_GAIN),
        }
    }

    /// Gyroscopic moment W × (J W) [N·m]
    pub fn gyroscopic_moment(&self, w: &Vec3) -> Vec3 {
        w.cross(&(self.inertia * w))
    }

    /// Trajectory-coupling moment J [(ŵ Rᵀ Rd Wd) − (Rᵀ Rd Wd_dot)] [N·m]
    ///
    /// Exactly zero when Wd = Wd_dot = 0.
    pub fn coupling_moment(
        &self,
        w: &Vec3,
        rt: &Mat3,
        rd: &Mat3,
        wd: &Vec3,
        wd_dot: &Vec3,
    ) -> Vec3 {
        let rt_rd = rt * rd;
        self.inertia * (hat(w) * rt_rd * wd - rt_rd * wd_dot)
    }

    /// Full feedforward moment for trajectory tracking [N·m]
    ///
    /// gyroscopic − coupling; collapses to the gyroscopic term alone when the
    /// desired rates are zero.
    pub fn trajectory_moment(
        &self,
        w: &Vec3,
        rt: &Mat3,
        rd: &Mat3,
        wd: &Vec3,
        wd_dot: &Vec3,
    ) -> Vec3 {
        self.gyroscopic_moment(w) - self.coupling_moment(w, rt, rd, wd, wd_dot)
    }

    /// Filtered angular-acceleration estimate from successive gyro samples
    ///
    /// Finite difference over the fixed control period, low-pass filtered.
    /// Advances the filter state; call once per cycle.
    pub fn angular_acceleration(&mut self, gyro: &Vec3) -> Vec3 {
        let raw = (gyro - self.prev_gyro) / self.dt;
        self.prev_gyro = *gyro;
        self.accel_filter.update(&raw)
    }

    /// Rigid-body moment estimate M = J ω̇ + ω × J ω for telemetry [N·m]
    ///
    /// Advances the angular-acceleration filter state; call once per cycle.
    pub fn moment_estimate(&mut self, gyro: &Vec3) -> DynamicsEstimate {
        let w_dot = self.angular_acceleration(gyro);
        let rotational = self.inertia * w_dot;
        DynamicsEstimate {
            total: rotational + self.gyroscopic_moment(gyro),
            rotational,
        }
    }

    /// Reset the filter memory
    pub fn reset(&mut self) {
        self.prev_gyro = Vec3::zeros();
        self.accel_filter.reset(Vec3::zeros());
    }
}
