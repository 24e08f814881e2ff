//! # MGFC Core
//!
//! Multirotor Geometric Flight Control - Core library
//!
//! Implements the geometric (SO(3)) attitude and position tracking controller
//! for an X-configuration quadrotor, from rotation-manifold error computation
//! down to per-motor PWM commands. The library is designed to run inside a
//! fixed-period real-time control task: every per-cycle path is bounded and
//! allocation free.
//!
//! ## Modules
//!
//! - [`math`]: SO(3) utilities (hat/vee maps, rotation conversions, manifold errors)
//! - [`control`]: Controllers (attitude, position, inertial feedforward, thrust allocation)
//! - [`config`]: Vehicle parameters, gains, and parameter-file loading
//! - [`telemetry`]: Named debug values for the external telemetry packetizer
//! - [`error`]: Control error taxonomy

pub mod config;
pub mod control;
pub mod error;
pub mod math;
pub mod telemetry;

// Common type aliases
use nalgebra::{Matrix3, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f64>;

/// Gravity constant [m/s²]
pub const GRAVITY: f64 = 9.8;
