pub mod book_repository;
pub mod lending_repository;
pub mod token_store;
pub mod user_repository;

// パブリックに型を再エクスポート
pub use book_repository::BookRepository as PostgresBookRepository;
pub use lending_repository::LendingRepository as PostgresLendingRepository;
pub use token_store::TokenStore as PostgresTokenStore;
pub use user_repository::UserRepository as PostgresUserRepository;
