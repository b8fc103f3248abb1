mod common;
pub mod configuration;
pub mod resources;
pub mod routes;

pub use common::ResourceKey;
pub use configuration::{Configuration, ConfigurationError};
pub use routes::{route_name, RouteError, RouteFactory, RouteSetBuilder};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;
