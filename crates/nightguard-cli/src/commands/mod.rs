//! Command implementations for nightguard

pub mod action;
pub mod media_type;
pub mod read;
pub mod vehicles;

pub use action::{action, windows};
pub use media_type::media_type;
pub use read::{details, read};
pub use vehicles::vehicles;
