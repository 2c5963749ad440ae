pub mod item;
pub mod theme;
pub mod config;

pub use item::*;
pub use theme::*;
pub use config::*;
