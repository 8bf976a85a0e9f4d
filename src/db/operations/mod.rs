pub mod content;
pub mod statistics;

pub use content::*;
pub use statistics::*;
