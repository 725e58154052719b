//! Simulated device definitions and the registry that holds them.

/// Ordered, validated device registry.
pub mod registry;
pub mod types;

pub use registry::DeviceRegistry;
pub use types::{Device, DeviceId};
