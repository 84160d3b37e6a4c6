pub mod build;
pub mod error;
pub mod stats;
pub mod store;
pub mod types;

pub use error::LoadError;
pub use store::StoreHandle;
pub use types::*;
