pub mod export;
pub mod import;
pub mod tappio;

pub use export::*;
pub use import::*;
