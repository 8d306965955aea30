//! Location adapters

pub mod cache;
pub mod gpsd;

pub use cache::LastKnownCache;
pub use gpsd::GpsdLocationSource;
