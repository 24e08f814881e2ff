//! Controllers
//!
//! The cascaded geometric control law and its actuation back end:
//! - Attitude controller (manifold errors to body moments)
//! - Position controller (tracking errors to force vector and desired attitude)
//! - Inertial feedforward (gyroscopic and trajectory-coupling moments)
//! - Thrust allocation (moments and collective force to motor PWM)
//! - Flight cycle (per-period orchestration, fail-safe, safety interlock)

pub mod allocation;
pub mod attitude;
pub mod flight;
pub mod inertia;
pub mod position;

pub use allocation::*;
pub use attitude::*;
pub use flight::*;
pub use inertia::*;
pub use position::*;
