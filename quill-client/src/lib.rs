pub mod error;
pub mod http_client;
pub mod models;

pub use error::ClientError;
pub use http_client::BlogClient;
pub use models::{AccountInfo, BlogListEntry, BlogPost, BlogsResponse, Credential, Role};
