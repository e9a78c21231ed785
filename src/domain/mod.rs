mod account;
mod balance_sheet;
mod event;
mod money;

pub use account::*;
pub use balance_sheet::*;
pub use event::*;
pub use money::*;
