pub mod context;
pub mod controller;
pub mod detail;
pub mod list_ops;
pub mod seed;
pub mod theme_ops;
