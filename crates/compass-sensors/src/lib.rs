pub mod filter;
pub mod fusion;
pub mod source;
pub mod types;

pub use fusion::{azimuth_from, OrientationFuser};
pub use source::{SensorRequest, SensorSink, SensorSource, SourceError, SENSOR_QUEUE_CAPACITY};
pub use types::{SensorAccuracy, SensorDelay, SensorEvent, SensorKind};
