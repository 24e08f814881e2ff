//! Flight control cycle
//!
//! Per-period orchestration of the cascaded controllers. An external
//! real-time scheduler invokes [`FlightController::update`] once every fixed
//! period; the call is bounded and allocation free, and it always returns a
//! usable motor command:
//!
//! - safety interlock engaged: all motors at the halt pulse, controllers
//!   skipped for that cycle
//! - detected unsafe condition (non-finite input, invalid attitude): the
//!   previous cycle's command is held and the fault logged
//! - degenerate thrust direction in tracking mode: the previous cycle's
//!   desired attitude is reused (level before the first valid cycle)
//!
//! Mode selection is pure per-cycle dispatch over [`FlightCommand`]; the
//! controller keeps no mode memory that could desynchronize from the caller.

use log::{info, warn};
use nalgebra::Matrix3;

use crate::config::FlightConfig;
use crate::error::ControlError;
use crate::math::{euler_to_rotation, quaternion_to_rotation, EulerAngles};
use crate::telemetry::{DynamicsDebug, GeometryDebug};
use crate::{Mat3, Vec3};

use super::allocation::ThrustAllocator;
use super::attitude::{AttitudeController, YawCommand};
use super::inertia::InertialFeedforward;
use super::position::PositionController;

/// Sensed vehicle state for one control cycle
#[derive(Debug, Clone, Copy)]
pub struct SensorState {
    /// Attitude estimate as a scalar-first unit quaternion
    pub attitude: [f64; 4],
    /// Body-frame angular velocity [rad/s], filtered upstream
    pub gyro: Vec3,
}

/// Position/velocity/acceleration setpoint with desired heading
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackingSetpoint {
    /// Desired position [m]
    pub position: Vec3,
    /// Desired velocity [m/s]
    pub velocity: Vec3,
    /// Desired (feedforward) acceleration [m/s²]
    pub acceleration: Vec3,
    /// Desired heading [rad]
    pub yaw: f64,
}

/// Per-cycle flight command, chosen by the caller every cycle
#[derive(Debug, Clone, Copy)]
pub enum FlightCommand {
    /// Attitude hold from direct stick commands
    Manual {
        /// Roll target [rad]
        roll: f64,
        /// Pitch target [rad]
        pitch: f64,
        /// Yaw attitude target or yaw-rate fallback
        yaw: YawCommand,
        /// Collective per-motor force basis, in the mixer force unit
        throttle: f64,
    },
    /// Position/velocity tracking from the external reference source
    Tracking {
        /// Measured position [m]
        position: Vec3,
        /// Measured velocity [m/s]
        velocity: Vec3,
        /// Tracking setpoint
        setpoint: TrackingSetpoint,
        /// Altitude-only submode: roll/pitch/yaw stay on the stick command
        manual_attitude: Option<EulerAngles>,
    },
}

/// Bounded PWM pulse widths, one per motor [µs]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommand {
    pub pulses: [u16; 4],
}

/// Cascaded geometric flight controller
///
/// Owns all controller state: gains, the feedforward filter memory, the
/// previous desired attitude, and the previous motor command. Single-writer
/// discipline: only the control task may call [`FlightController::update`];
/// a concurrent tuning or telemetry task must serialize its access
/// externally.
#[derive(Debug)]
pub struct FlightController {
    /// Attitude (inner) loop
    pub attitude: AttitudeController,
    /// Position (outer) loop
    pub position: PositionController,
    feedforward: InertialFeedforward,
    allocator: ThrustAllocator,
    last_rd: (Mat3, Mat3),
    last_pulses: [u16; 4],
    geometry_debug: GeometryDebug,
    dynamics_debug: DynamicsDebug,
}

impl FlightController {
    pub fn new(config: &FlightConfig) -> Self {
        info!(
            "flight controller init: mass {} kg, period {} s",
            config.vehicle.mass, config.dt
        );

        let allocator = ThrustAllocator::new(config.mixer.clone());
        let halt = allocator.halt();
        Self {
            attitude: AttitudeController::new(config.attitude.clone()),
            position: PositionController::new(config.position.clone(), config.vehicle.mass),
            feedforward: InertialFeedforward::new(config.vehicle.inertia_matrix(), config.dt),
            allocator,
            last_rd: (Matrix3::identity(), Matrix3::identity()),
            last_pulses: halt,
            geometry_debug: GeometryDebug::default(),
            dynamics_debug: DynamicsDebug::default(),
        }
    }

    /// Run one control cycle
    ///
    /// Never fails: faults degrade to the previous command for one cycle and
    /// are logged. NaN or Inf never reaches the motor outputs.
    pub fn update(
        &mut self,
        sensors: &SensorState,
        command: &FlightCommand,
        safety_engaged: bool,
    ) -> MotorCommand {
        let gyro_ok = sensors.gyro.iter().all(|v| v.is_finite());
        if gyro_ok {
            self.dynamics_debug = DynamicsDebug::from(self.feedforward.moment_estimate(&sensors.gyro));
        }

        if safety_engaged {
            self.last_pulses = self.allocator.halt();
            return MotorCommand {
                pulses: self.last_pulses,
            };
        }

        if !gyro_ok {
            warn!("non-finite gyro sample, holding previous command");
            return MotorCommand {
                pulses: self.last_pulses,
            };
        }

        match self.cycle(sensors, command) {
            Ok(pulses) => {
                self.last_pulses = pulses;
                MotorCommand { pulses }
            }
            Err(e) => {
                warn!("control cycle fault, holding previous command: {e}");
                MotorCommand {
                    pulses: self.last_pulses,
                }
            }
        }
    }

    fn cycle(
        &mut self,
        sensors: &SensorState,
        command: &FlightCommand,
    ) -> Result<[u16; 4], ControlError> {
        match command {
            FlightCommand::Manual {
                roll,
                pitch,
                yaw,
                throttle,
            } => {
                if !throttle.is_finite() {
                    return Err(ControlError::NonFiniteInput {
                        quantity: "throttle",
                    });
                }
                let out = self.attitude.hold_moments(
                    &sensors.attitude,
                    &sensors.gyro,
                    *roll,
                    *pitch,
                    *yaw,
                    &self.feedforward,
                )?;
                self.geometry_debug = GeometryDebug::from(&out);
                Ok(self.allocator.allocate(&out.moments, *throttle))
            }
            FlightCommand::Tracking {
                position,
                velocity,
                setpoint,
                manual_attitude,
            } => {
                let (r, rt) = quaternion_to_rotation(&sensors.attitude)?;

                let f_ctrl = self.position.force_command(
                    position,
                    &setpoint.position,
                    velocity,
                    &setpoint.velocity,
                    &setpoint.acceleration,
                );
                if !f_ctrl.iter().all(|v| v.is_finite()) {
                    return Err(ControlError::NonFiniteInput {
                        quantity: "force command",
                    });
                }

                let (rd, rtd) = match manual_attitude {
                    Some(euler) => euler_to_rotation(euler),
                    None => match self.position.desired_attitude(&f_ctrl, setpoint.yaw) {
                        Ok(pair) => {
                            self.last_rd = pair;
                            pair
                        }
                        Err(e) => {
                            warn!("thrust direction undefined, reusing previous attitude target: {e}");
                            self.last_rd
                        }
                    },
                };

                let force = self.position.collective_force(&f_ctrl, &r);
                let out = self
                    .attitude
                    .tracking_moments(&r, &rt, &rd, &rtd, &sensors.gyro, &self.feedforward);
                self.geometry_debug = GeometryDebug::from(&out);
                Ok(self.allocator.allocate(&out.moments, force))
            }
        }
    }

    /// Latest geometric controller debug values
    pub fn geometry_debug(&self) -> &GeometryDebug {
        &self.geometry_debug
    }

    /// Latest rigid-body dynamics estimate
    pub fn dynamics_debug(&self) -> &DynamicsDebug {
        &self.dynamics_debug
    }

    /// Clear filter memory and fail-safe state (bench use, not in flight)
    pub fn reset(&mut self) {
        self.feedforward.reset();
        self.last_rd = (Matrix3::identity(), Matrix3::identity());
        self.last_pulses = self.allocator.halt();
    }
}
