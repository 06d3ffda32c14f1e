pub mod error;
pub mod model;
pub mod runtime;
pub mod rwa;

pub use error::RwaError;
