pub mod classifier;
pub mod table;
pub mod types;

pub use classifier::*;
pub use table::{names, standard_definitions};
pub use types::*;
