// src/sensors.rs

//! # Hardware Collaborators
//!
//! Traits for the sensors and actuators the flight core consumes, plus the
//! small amount of conversion logic that sits directly on top of a raw ADC
//! channel, a pair of PWM channels, or an ultrasonic echo time. Register
//! level drivers implement these traits outside this crate.

use crate::estimator::{ImuSample, MagSample};

/// Accelerometer and gyroscope.
#[allow(async_fn_in_trait)]
pub trait InertialSensor {
    /// Bus or device error.
    type Error;

    /// Probes and configures the device.
    async fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Reads acceleration (m/s²) and angular rate (rad/s).
    async fn read_accel_gyro(&mut self) -> Result<ImuSample, Self::Error>;
}

/// Three-axis magnetometer.
#[allow(async_fn_in_trait)]
pub trait MagnetometerSensor {
    /// Bus or device error.
    type Error;

    /// Reads the raw, tilt-affected field.
    async fn read_raw(&mut self) -> Result<MagSample, Self::Error>;
}

/// Angular position of a control surface.
pub trait PositionSensor {
    /// Current angle in degrees relative to the zero reference.
    fn read_angle(&mut self) -> f32;

    /// Takes the current position as the zero reference.
    fn zero(&mut self);
}

/// Distance to the ground.
#[allow(async_fn_in_trait)]
pub trait RangingSensor {
    /// Bus or device error.
    type Error;

    /// Measures the distance in centimeters. May wait for a full echo round
    /// trip, so callers bound it with a timeout.
    async fn read_distance_cm(&mut self) -> Result<f32, Self::Error>;
}

/// Signed duty output to one control surface motor.
pub trait MotorActuator {
    /// Drives the motor at `duty` percent, `-100..=100`.
    fn set_duty_percent(&mut self, duty: i8);
}

/// One analog input channel.
pub trait AdcChannel {
    /// Raw conversion result.
    fn read_raw(&mut self) -> u16;
}

/// One PWM output channel.
pub trait PwmChannel {
    /// Duty value corresponding to 100 %.
    fn max_duty(&self) -> u16;

    /// Sets the raw duty value.
    fn set_duty(&mut self, duty: u16);
}

/// Speed of sound over two, in cm/µs, for a there-and-back echo.
const HALF_SPEED_OF_SOUND_CM_PER_US: f32 = 0.034 / 2.0;

/// Converts an ultrasonic echo pulse width to a distance.
pub fn echo_to_distance_cm(echo_us: u32) -> f32 {
    echo_us as f32 * HALF_SPEED_OF_SOUND_CM_PER_US
}

// 12-bit ADC against a 3.3 V reference
const ADC_RANGE: f32 = 4096.0;
const ADC_REFERENCE_VOLTS: f32 = 3.3;
/// Measured on the servo bodies.
const DEGREES_PER_VOLT: f32 = 60.0;

/// A potentiometer on an ADC channel reporting surface angle.
pub struct Potentiometer<A> {
    adc: A,
    voltage_offset: f32,
}

impl<A: AdcChannel> Potentiometer<A> {
    /// Creates a potentiometer with the given zero voltage.
    pub fn new(adc: A, voltage_offset: f32) -> Self {
        Self {
            adc,
            voltage_offset,
        }
    }

    /// Wiper voltage.
    pub fn voltage(&mut self) -> f32 {
        ADC_REFERENCE_VOLTS * self.adc.read_raw() as f32 / ADC_RANGE
    }

    /// Voltage taken as zero degrees.
    pub fn voltage_offset(&self) -> f32 {
        self.voltage_offset
    }
}

impl<A: AdcChannel> PositionSensor for Potentiometer<A> {
    fn read_angle(&mut self) -> f32 {
        (self.voltage() - self.voltage_offset) * DEGREES_PER_VOLT
    }

    fn zero(&mut self) {
        self.voltage_offset = self.voltage();
    }
}

/// Two-input H-bridge motor driver such as the DRV8871. Positive duty
/// drives input A, negative duty drives input B.
pub struct HBridge<A, B> {
    in_a: A,
    in_b: B,
    duty: i8,
}

impl<A: PwmChannel, B: PwmChannel> HBridge<A, B> {
    /// Creates a driver with both inputs off.
    pub fn new(mut in_a: A, mut in_b: B) -> Self {
        in_a.set_duty(0);
        in_b.set_duty(0);
        Self {
            in_a,
            in_b,
            duty: 0,
        }
    }

    /// Duty applied last, after clamping.
    pub fn duty(&self) -> i8 {
        self.duty
    }

    /// Releases the two channels.
    pub fn release(self) -> (A, B) {
        (self.in_a, self.in_b)
    }
}

fn scale(percent: u8, max_duty: u16) -> u16 {
    (max_duty as u32 * percent as u32 / 100) as u16
}

impl<A: PwmChannel, B: PwmChannel> MotorActuator for HBridge<A, B> {
    fn set_duty_percent(&mut self, duty: i8) {
        let duty = duty.clamp(-100, 100);
        self.duty = duty;

        if duty > 0 {
            let value = scale(duty.unsigned_abs(), self.in_a.max_duty());
            self.in_b.set_duty(0);
            self.in_a.set_duty(value);
        } else if duty < 0 {
            let value = scale(duty.unsigned_abs(), self.in_b.max_duty());
            self.in_a.set_duty(0);
            self.in_b.set_duty(value);
        } else {
            self.in_a.set_duty(0);
            self.in_b.set_duty(0);
        }
    }
}
