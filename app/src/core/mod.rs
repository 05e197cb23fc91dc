pub mod datapoint;
pub mod id;
pub mod persistence;
pub mod registry;
pub mod time;
pub mod unit;

pub use datapoint::DataPoint;
pub use registry::{Registry, RegistryError, Subscription};
