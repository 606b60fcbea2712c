//! Protocol types shared by the cortex daemon and its clients.
//!
//! A client sends one [`Request`] naming a method from [`methods`] and
//! receives exactly one [`Response`]. Payloads for the monitoring and alert
//! methods are described by [`HealthSnapshot`] and [`Alert`].

mod alerts;
mod health;
pub mod methods;
mod protocol;

pub use alerts::{Alert, AlertFilter, AlertSeverity, AlertTarget};
pub use health::{HealthSnapshot, HealthStatus, ResourceUsage};
pub use protocol::{ErrorKind, Request, Response};
