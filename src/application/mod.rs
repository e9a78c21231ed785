// Application layer - use cases and orchestration over the storage layer.

pub mod balance_sheet;
pub mod error;
pub mod reporting;
pub mod service;

pub use balance_sheet::*;
pub use error::*;
pub use reporting::*;
pub use service::*;
