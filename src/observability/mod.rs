//! Observability: markdown run logging.

mod logger;

pub use logger::Logger;
