pub mod access;
pub mod account;
pub mod error;
pub mod post;

pub use access::Principal;
pub use account::{Account, Role};
pub use error::DomainError;
pub use post::Post;
