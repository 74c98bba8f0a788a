pub mod api;
pub mod error;
pub mod http;

pub use api::ServiceApi;
pub use error::ServiceError;
pub use http::HttpServiceApi;
