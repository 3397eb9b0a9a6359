// src/tasks.rs

//! # Task Bodies
//!
//! Periodic task bodies that connect the hardware collaborators, the flight
//! core and the [`Shares`](crate::shares::Shares). Each task has a
//! synchronous or single-shot step that can be driven directly, and a `run`
//! method that repeats the step on an `embassy_time::Ticker` forever.
//!
//! A board crate spawns them from its executor, e.g.:
//!
//! ```ignore
//! static SHARES: Shares = Shares::new();
//!
//! #[embassy_executor::task]
//! async fn control(task: ControlTask<RudderPot, ElevatorPot>) {
//!     task.run(&SHARES).await
//! }
//! ```
//!
//! | Task     | Period | Writes                         | Reads               |
//! |----------|--------|--------------------------------|---------------------|
//! | ranging  | 100 ms | `near_ground`                  |                     |
//! | attitude | 1 ms   | `attitude`, `attitude_ready`   | `zero_yaw`          |
//! | control  | 50 ms  | `phase`, both duties           | everything else     |
//! | motor    | 50 ms  |                                | one duty            |

pub mod attitude;
pub mod control;
pub mod motor;
pub mod ranging;

pub use attitude::AttitudeTask;
pub use control::ControlTask;
pub use motor::MotorTask;
pub use ranging::{is_near_ground, RangingTask};
