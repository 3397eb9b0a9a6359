// src/tasks/ranging.rs

//! Ranging task: publishes whether the glider is near the ground.

use embassy_time::{with_timeout, Ticker};

use crate::config::RangingConfig;
use crate::error::{Error, Result};
use crate::sensors::RangingSensor;
use crate::shares::Shares;

/// Whether a distance counts as near the ground. Invalid (NaN) distances
/// never do.
pub fn is_near_ground(distance_cm: f32, threshold_cm: f32) -> bool {
    distance_cm < threshold_cm
}

/// Ranging task state.
pub struct RangingTask<S> {
    sensor: S,
    config: RangingConfig,
}

impl<S: RangingSensor> RangingTask<S> {
    /// Creates the task.
    pub fn new(sensor: S, config: RangingConfig) -> Self {
        Self { sensor, config }
    }

    /// Takes one bounded measurement and classifies it.
    pub async fn sample(&mut self) -> Result<bool> {
        match with_timeout(self.config.timeout, self.sensor.read_distance_cm()).await {
            Ok(Ok(distance)) => Ok(is_near_ground(distance, self.config.near_ground_cm)),
            Ok(Err(_)) => Err(Error::RangingRead),
            Err(_) => Err(Error::RangingTimeout),
        }
    }

    /// Takes one measurement and publishes it. On failure the previous flag
    /// is left in place.
    pub async fn update(&mut self, shares: &Shares) -> Result<bool> {
        let near = self.sample().await?;
        if near != shares.near_ground.replace(near) {
            debug!("near ground: {}", near);
        }
        Ok(near)
    }

    /// Runs the task forever.
    pub async fn run(mut self, shares: &Shares) -> ! {
        let mut ticker = Ticker::every(self.config.period);
        loop {
            if let Err(error) = self.update(shares).await {
                warn!("ranging: {}", error);
            }
            ticker.next().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    enum Echo {
        Distance(f32),
        Fault,
        Never,
    }

    impl RangingSensor for Echo {
        type Error = ();

        async fn read_distance_cm(&mut self) -> core::result::Result<f32, ()> {
            match self {
                Echo::Distance(distance) => Ok(*distance),
                Echo::Fault => Err(()),
                Echo::Never => core::future::pending().await,
            }
        }
    }

    /// Test that the near-ground threshold is strict.
    #[test]
    fn test_near_ground_threshold() {
        assert!(is_near_ground(19.9, 20.0));
        assert!(!is_near_ground(20.0, 20.0));
        assert!(!is_near_ground(150.0, 20.0));
        assert!(!is_near_ground(f32::NAN, 20.0));
    }

    /// Test that each reading publishes its near-ground flag.
    #[test]
    fn test_publishes_classified_distance() {
        let shares = Shares::new();
        let mut task = RangingTask::new(Echo::Distance(12.0), RangingConfig::new());
        assert_eq!(Ok(true), block_on(task.update(&shares)));
        assert!(shares.near_ground.get());

        let mut task = RangingTask::new(Echo::Distance(80.0), RangingConfig::new());
        assert_eq!(Ok(false), block_on(task.update(&shares)));
        assert!(!shares.near_ground.get());
    }

    /// Test that a failed reading keeps the previous flag.
    #[test]
    fn test_read_error_keeps_previous_flag() {
        let shares = Shares::new();
        shares.near_ground.put(true);

        let mut task = RangingTask::new(Echo::Fault, RangingConfig::new());
        assert_eq!(Err(Error::RangingRead), block_on(task.update(&shares)));
        assert!(shares.near_ground.get());
    }

    /// Test that a missing echo times out and keeps the previous flag.
    #[test]
    fn test_missing_echo_times_out() {
        let shares = Shares::new();
        shares.near_ground.put(true);

        let config = RangingConfig {
            timeout: embassy_time::Duration::from_millis(5),
            ..RangingConfig::new()
        };
        let mut task = RangingTask::new(Echo::Never, config);
        assert_eq!(Err(Error::RangingTimeout), block_on(task.update(&shares)));
        assert!(shares.near_ground.get());
    }
}
