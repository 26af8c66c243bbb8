pub mod rest;
pub mod views;

pub use rest::router;
