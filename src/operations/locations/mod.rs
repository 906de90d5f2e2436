//! Location operations

pub mod add;
pub mod remove;
pub mod index;

pub use add::*;
pub use remove::*;
pub use index::*;