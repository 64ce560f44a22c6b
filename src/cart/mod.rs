pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::CartError;
pub use handlers::*;
pub use models::*;
pub use repository::CartRepository;
pub use service::CartService;
