pub mod holder;
pub mod swap_path;
pub mod vault;

pub use holder::*;
pub use swap_path::*;
pub use vault::*;
