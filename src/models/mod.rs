pub mod event;
pub mod game;
pub mod review;

pub use event::*;
pub use game::*;
pub use review::*;
