pub mod config;
pub mod constants;
pub mod keyer;
pub mod locator;
pub mod message;
pub mod scheduler;
pub mod telemetry_log;
pub mod tracing_init;
pub mod u4b;
pub mod util;

pub use config::{Config, TelemetryMode};
pub use message::{encode, EncodeError, SymbolSequence, WsprMessage};
pub use scheduler::{Scheduler, SchedulerState};
