pub mod book_repository;
pub mod lending_repository;
pub mod token_store;
pub mod user_repository;

pub use book_repository::*;
pub use lending_repository::*;
pub use token_store::*;
pub use user_repository::*;
