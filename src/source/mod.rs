//! Form configuration sources

mod catalog;
mod traits;

pub use catalog::CatalogSource;
pub use traits::{fetch_with_timeout, ConfigSource};

#[cfg(test)]
pub use traits::MockConfigSource;
