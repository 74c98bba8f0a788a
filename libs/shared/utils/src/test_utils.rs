use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use shared_client::{ServiceApi, ServiceError};
use shared_config::{ErrorSelection, SimulatorConfig, WorkflowConfig};
use shared_models::{
    AuthToken, LoginRequest, NewProduct, Operation, Product, ProductUpdate, RegisterRequest,
    RegisterResponse, UserProfile,
};

pub struct TestConfig {
    pub user_service_url: String,
    pub product_service_url: String,
    pub load_percentage: u8,
    pub max_users: u32,
    pub error_percentage: u8,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            user_service_url: "http://localhost:5001/api/users".to_string(),
            product_service_url: "http://localhost:5002/api/products".to_string(),
            load_percentage: 50,
            max_users: 10,
            error_percentage: 0,
        }
    }
}

impl TestConfig {
    /// Points both services at a single mock server.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            user_service_url: format!("{}/api/users", base_url),
            product_service_url: format!("{}/api/products", base_url),
            ..Self::default()
        }
    }

    /// Config with zero pacing so workflows run without wall-clock waits.
    pub fn to_simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            user_service_url: self.user_service_url.clone(),
            product_service_url: self.product_service_url.clone(),
            load_percentage: self.load_percentage,
            error_percentage: self.error_percentage,
            max_users: self.max_users,
            user_pool_size: 1000,
            error_selection: ErrorSelection::Weighted,
            request_timeout: Duration::from_secs(5),
            workflow: WorkflowConfig::instant(),
        }
    }
}

/// How the scripted API answers calls to one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail,
    /// Fail the first `n` calls, then succeed.
    FailTimes(u32),
    /// Record the call, then panic the calling task.
    Panic,
}

#[derive(Default)]
struct ScriptState {
    calls: Vec<Operation>,
    failures: HashMap<Operation, u32>,
    next_product_id: i64,
}

/// In-memory `ServiceApi` that records every call and fails on demand.
pub struct ScriptedServiceApi {
    behaviors: HashMap<Operation, Behavior>,
    state: Mutex<ScriptState>,
}

impl Default for ScriptedServiceApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedServiceApi {
    /// Every operation succeeds.
    pub fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            state: Mutex::new(ScriptState {
                next_product_id: 1,
                ..ScriptState::default()
            }),
        }
    }

    pub fn with(mut self, operation: Operation, behavior: Behavior) -> Self {
        self.behaviors.insert(operation, behavior);
        self
    }

    pub fn failing(operation: Operation) -> Self {
        Self::new().with(operation, Behavior::Fail)
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.state.lock().expect("scripted api state poisoned").calls.clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls().iter().filter(|op| **op == operation).count()
    }

    fn answer(&self, operation: Operation) -> Result<(), ServiceError> {
        let behavior = self.behaviors.get(&operation).copied().unwrap_or(Behavior::Succeed);
        let mut state = self.state.lock().expect("scripted api state poisoned");
        state.calls.push(operation);

        let fail = match behavior {
            Behavior::Panic => {
                drop(state);
                panic!("scripted panic during {}", operation);
            }
            Behavior::Succeed => false,
            Behavior::Fail => true,
            Behavior::FailTimes(n) => {
                let failed = state.failures.entry(operation).or_insert(0);
                if *failed < n {
                    *failed += 1;
                    true
                } else {
                    false
                }
            }
        };

        if fail {
            return Err(ServiceError::UnexpectedStatus {
                expected: operation.expected_status(),
                status: 500,
                body: "scripted failure".to_string(),
            });
        }
        Ok(())
    }

    fn next_product_id(&self) -> i64 {
        let mut state = self.state.lock().expect("scripted api state poisoned");
        let id = state.next_product_id;
        state.next_product_id += 1;
        id
    }
}

#[async_trait]
impl ServiceApi for ScriptedServiceApi {
    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ServiceError> {
        self.answer(Operation::Register)?;
        Ok(RegisterResponse {
            message: Some(format!("{} created", request.username)),
        })
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthToken, ServiceError> {
        self.answer(Operation::Login)?;
        Ok(AuthToken::new(format!("token-{}", request.username)))
    }

    async fn fetch_profile(&self, _token: &AuthToken) -> Result<UserProfile, ServiceError> {
        self.answer(Operation::FetchProfile)?;
        Ok(UserProfile {
            id: 1,
            username: "user1".to_string(),
            email: "user1@example.com".to_string(),
        })
    }

    async fn list_products(&self, _token: Option<&AuthToken>) -> Result<Vec<Product>, ServiceError> {
        self.answer(Operation::ListProducts)?;
        Ok(Vec::new())
    }

    async fn create_product(
        &self,
        _token: &AuthToken,
        product: &NewProduct,
    ) -> Result<Product, ServiceError> {
        self.answer(Operation::CreateProduct)?;
        Ok(Product {
            id: self.next_product_id(),
            name: product.name.clone(),
            description: Some(product.description.clone()),
            price: product.price,
            stock: product.stock,
            category: Some(product.category.clone()),
        })
    }

    async fn update_product(
        &self,
        _token: &AuthToken,
        product_id: i64,
        update: &ProductUpdate,
    ) -> Result<Product, ServiceError> {
        self.answer(Operation::UpdateProduct)?;
        Ok(Product {
            id: product_id,
            name: update.name.clone(),
            description: Some(update.description.clone()),
            price: update.price,
            stock: update.stock,
            category: None,
        })
    }

    async fn delete_product(&self, _token: &AuthToken, _product_id: i64) -> Result<(), ServiceError> {
        self.answer(Operation::DeleteProduct)
    }
}

pub struct MockServiceResponses;

impl MockServiceResponses {
    pub fn register_response() -> serde_json::Value {
        json!({
            "message": "User created successfully"
        })
    }

    pub fn login_response(token: &str) -> serde_json::Value {
        json!({
            "access_token": token
        })
    }

    pub fn profile_response(user_id: u32) -> serde_json::Value {
        json!({
            "id": user_id,
            "username": format!("user{}", user_id),
            "email": format!("user{}@example.com", user_id)
        })
    }

    pub fn product_response(product_id: i64, name: &str) -> serde_json::Value {
        json!({
            "id": product_id,
            "name": name,
            "description": format!("Description for {}", name),
            "price": 99.99,
            "stock": 10,
            "category": "Books"
        })
    }

    pub fn error_response(message: &str) -> serde_json::Value {
        json!({
            "error": message
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::with_base_url("http://127.0.0.1:9999").to_simulator_config();

        assert_eq!(config.user_service_url, "http://127.0.0.1:9999/api/users");
        assert_eq!(config.product_service_url, "http://127.0.0.1:9999/api/products");
        assert_eq!(config.workflow, WorkflowConfig::instant());
    }

    #[test]
    fn test_scripted_api_fails_then_recovers() {
        let api = ScriptedServiceApi::new().with(Operation::Login, Behavior::FailTimes(2));
        let request = LoginRequest {
            username: "user1".to_string(),
            password: "password1".to_string(),
        };

        assert!(tokio_test::block_on(api.login(&request)).is_err());
        assert!(tokio_test::block_on(api.login(&request)).is_err());
        assert!(tokio_test::block_on(api.login(&request)).is_ok());
        assert_eq!(api.call_count(Operation::Login), 3);
    }

    #[test]
    fn test_scripted_api_assigns_product_ids() {
        let api = ScriptedServiceApi::new();
        let token = AuthToken::new("t");
        let product = NewProduct {
            name: "Product 1".to_string(),
            description: "Description for product 1".to_string(),
            price: 10.0,
            stock: 1,
            category: "Books".to_string(),
        };

        let first = tokio_test::block_on(api.create_product(&token, &product)).unwrap();
        let second = tokio_test::block_on(api.create_product(&token, &product)).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }
}
