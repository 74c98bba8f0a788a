pub mod operation;
pub mod product;
pub mod user;

pub use operation::Operation;
pub use product::{NewProduct, Product, ProductUpdate};
pub use user::{AuthToken, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, SimulatedUser, UserProfile};
