mod electric;
mod kwh;
mod watt;

pub use electric::{MilliAmpere, Volt};
pub use kwh::KiloWattHours;
pub use watt::Watt;
