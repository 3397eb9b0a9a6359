// src/tasks/attitude.rs

//! Attitude task: runs the estimator as fast as the sensors allow.

use embassy_time::{Duration, Instant, Ticker};

use crate::config::EstimatorConfig;
use crate::error::{Error, Result};
use crate::estimator::{Attitude, AttitudeEstimator};
use crate::sensors::{InertialSensor, MagnetometerSensor};
use crate::shares::Shares;

/// Attitude task state. Only constructible from an initialized inertial
/// sensor.
pub struct AttitudeTask<I, M> {
    imu: I,
    mag: M,
    estimator: AttitudeEstimator,
}

impl<I: InertialSensor, M: MagnetometerSensor> AttitudeTask<I, M> {
    /// Initializes the inertial sensor and publishes whether attitude data
    /// will be available.
    ///
    /// Fails with [`Error::InertialInit`] if the sensor does not come up;
    /// `attitude_ready` then stays `false` and the control task holds the
    /// glider disabled.
    pub async fn start(
        mut imu: I,
        mag: M,
        config: EstimatorConfig,
        shares: &Shares,
    ) -> Result<Self> {
        if imu.initialize().await.is_err() {
            error!("inertial sensor did not initialize");
            shares.attitude_ready.put(false);
            return Err(Error::InertialInit);
        }

        info!("inertial sensor ready");
        shares.attitude_ready.put(true);
        Ok(Self {
            imu,
            mag,
            estimator: AttitudeEstimator::with_config(config),
        })
    }

    /// The estimator, e.g. to change fusion weights in flight.
    pub fn estimator_mut(&mut self) -> &mut AttitudeEstimator {
        &mut self.estimator
    }

    /// Reads both sensors, advances the estimate to `now` and publishes it.
    ///
    /// A pending `zero_yaw` request is serviced once an estimate exists.
    /// Returns `Ok(None)` on the first tick, which only records the time.
    pub async fn tick(&mut self, now: Instant, shares: &Shares) -> Result<Option<Attitude>> {
        let imu = self
            .imu
            .read_accel_gyro()
            .await
            .map_err(|_| Error::InertialRead)?;
        let mag = self
            .mag
            .read_raw()
            .await
            .map_err(|_| Error::MagnetometerRead)?;

        let Some(mut attitude) = self.estimator.update(now, imu, mag) else {
            return Ok(None);
        };

        if shares.zero_yaw.replace(false) {
            self.estimator.zero();
            attitude = self.estimator.attitude();
            info!("yaw zeroed");
        }

        shares.attitude.put(attitude);
        Ok(Some(attitude))
    }

    /// Runs the task forever with the given period.
    pub async fn run(mut self, shares: &Shares, period: Duration) -> ! {
        let mut ticker = Ticker::every(period);
        loop {
            if let Err(error) = self.tick(Instant::now(), shares).await {
                warn!("attitude: {}", error);
            }
            ticker.next().await;
        }
    }
}
