pub mod admin;
pub mod create_holder;
pub mod deposit;
pub mod earn;
pub mod emergency;
pub mod initialize_maximizer;
pub mod initialize_vault;
pub mod maximizer;
pub mod set_swap_path;
pub mod transfer_shares;
pub mod withdraw;

pub use admin::*;
pub use create_holder::*;
pub use deposit::*;
pub use earn::*;
pub use emergency::*;
pub use initialize_maximizer::*;
pub use initialize_vault::*;
pub use maximizer::*;
pub use set_swap_path::*;
pub use transfer_shares::*;
pub use withdraw::*;
