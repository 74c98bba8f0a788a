use std::future::Future;
use std::sync::Arc;

use tracing::{error, info};

use shared_client::{ServiceApi, ServiceError};
use shared_models::{
    AuthToken, NewProduct, Operation, Product, ProductUpdate, RegisterResponse, SimulatedUser,
    UserProfile,
};

use crate::services::injector::ErrorInjector;

/// Session-facing view of the remote services. Every call first goes through
/// the error injector; any failure, injected or real, is logged and reported
/// as `None`/`false`.
#[derive(Clone)]
pub struct ClientAdapter {
    api: Arc<dyn ServiceApi>,
    injector: ErrorInjector,
}

impl ClientAdapter {
    pub fn new(api: Arc<dyn ServiceApi>, injector: ErrorInjector) -> Self {
        Self { api, injector }
    }

    async fn guarded<T, F>(&self, user: &SimulatedUser, operation: Operation, call: F) -> Option<T>
    where
        F: Future<Output = Result<T, ServiceError>>,
    {
        if let Some(failure) = self.injector.inject().await {
            error!("{}: Simulated {} during {}", user, failure, operation);
            return None;
        }

        match call.await {
            Ok(value) => {
                info!("{}: {} successful", user, operation);
                Some(value)
            }
            Err(e) => {
                error!("{}: {} failed - {}", user, operation, e);
                None
            }
        }
    }

    pub async fn register(&self, user: &SimulatedUser) -> Option<RegisterResponse> {
        let request = user.register_request();
        self.guarded(user, Operation::Register, self.api.register(&request))
            .await
    }

    pub async fn login(&self, user: &SimulatedUser) -> Option<AuthToken> {
        let request = user.login_request();
        self.guarded(user, Operation::Login, self.api.login(&request))
            .await
    }

    pub async fn fetch_profile(&self, user: &SimulatedUser, token: &AuthToken) -> Option<UserProfile> {
        self.guarded(user, Operation::FetchProfile, self.api.fetch_profile(token))
            .await
    }

    pub async fn list_products(
        &self,
        user: &SimulatedUser,
        token: Option<&AuthToken>,
    ) -> Option<Vec<Product>> {
        self.guarded(user, Operation::ListProducts, self.api.list_products(token))
            .await
    }

    pub async fn create_product(
        &self,
        user: &SimulatedUser,
        token: &AuthToken,
        product: &NewProduct,
    ) -> Option<Product> {
        self.guarded(user, Operation::CreateProduct, self.api.create_product(token, product))
            .await
    }

    pub async fn update_product(
        &self,
        user: &SimulatedUser,
        token: &AuthToken,
        product_id: i64,
        update: &ProductUpdate,
    ) -> Option<Product> {
        self.guarded(
            user,
            Operation::UpdateProduct,
            self.api.update_product(token, product_id, update),
        )
        .await
    }

    pub async fn delete_product(&self, user: &SimulatedUser, token: &AuthToken, product_id: i64) -> bool {
        self.guarded(
            user,
            Operation::DeleteProduct,
            self.api.delete_product(token, product_id),
        )
        .await
        .is_some()
    }
}
