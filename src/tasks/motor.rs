// src/tasks/motor.rs

//! Motor task: forwards one surface's duty share to its motor driver.

use embassy_time::{Duration, Ticker};

use crate::sensors::MotorActuator;
use crate::shares::SharedCell;

/// Motor task state for one control surface.
pub struct MotorTask<'a, M> {
    motor: M,
    duty: &'a SharedCell<i8>,
    period: Duration,
}

impl<'a, M: MotorActuator> MotorTask<'a, M> {
    /// Creates a task driving `motor` from `duty` every `period`.
    pub fn new(motor: M, duty: &'a SharedCell<i8>, period: Duration) -> Self {
        Self {
            motor,
            duty,
            period,
        }
    }

    /// Applies the latest duty and returns it.
    pub fn apply(&mut self) -> i8 {
        let duty = self.duty.get();
        self.motor.set_duty_percent(duty);
        duty
    }

    /// Runs the task forever.
    pub async fn run(mut self) -> ! {
        let mut ticker = Ticker::every(self.period);
        loop {
            self.apply();
            ticker.next().await;
        }
    }
}
