pub mod error;
pub mod extractor;
pub mod handlers;
pub mod router;
pub mod types;

pub use error::ApiError;
pub use extractor::CurrentUser;
pub use router::create_router;
pub use types::*;
