use async_trait::async_trait;

use shared_models::{
    AuthToken, LoginRequest, NewProduct, Product, ProductUpdate, RegisterRequest,
    RegisterResponse, UserProfile,
};

use crate::ServiceError;

/// The remote user and product services, one method per capability.
///
/// Implementations report why a call failed; callers that only care about
/// success collapse the error themselves.
#[async_trait]
pub trait ServiceApi: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ServiceError>;

    async fn login(&self, request: &LoginRequest) -> Result<AuthToken, ServiceError>;

    async fn fetch_profile(&self, token: &AuthToken) -> Result<UserProfile, ServiceError>;

    async fn list_products(&self, token: Option<&AuthToken>) -> Result<Vec<Product>, ServiceError>;

    async fn create_product(
        &self,
        token: &AuthToken,
        product: &NewProduct,
    ) -> Result<Product, ServiceError>;

    async fn update_product(
        &self,
        token: &AuthToken,
        product_id: i64,
        update: &ProductUpdate,
    ) -> Result<Product, ServiceError>;

    async fn delete_product(&self, token: &AuthToken, product_id: i64) -> Result<(), ServiceError>;
}
