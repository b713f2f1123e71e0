pub mod book;
pub mod commands;
pub mod history;
pub mod lending;
pub mod user;
pub mod value_objects;

pub use book::*;
pub use lending::*;
pub use user::*;
pub use value_objects::*;
