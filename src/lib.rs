pub mod demo;
pub mod dist;
pub mod error;
pub mod model;
pub mod report;
pub mod routing;
pub mod scenario;
pub mod server;
pub mod sim;
pub mod stats;
pub mod validate;

pub use error::SimError;
pub use validate::{ValidationError, validate};

#[cfg(test)]
mod test;
