//! Climate viewer core: year timeline playback and the data request gateway.

pub mod config;
pub mod gateway;
pub mod logging;
pub mod timeline;

pub use config::Config;
pub use gateway::{GatewayError, RequestGateway};
pub use timeline::{Location, PlaybackState, Statistic, TimelineController, TimelineError, YearRange};
