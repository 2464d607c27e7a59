pub mod error;
pub mod format;
pub mod types;

pub use error::*;
pub use format::*;
pub use types::*;
