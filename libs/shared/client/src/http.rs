use async_trait::async_trait;
use reqwest::{
    Client, Method, Response,
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use shared_config::SimulatorConfig;
use shared_models::{
    AuthToken, LoginRequest, LoginResponse, NewProduct, Operation, Product, ProductUpdate,
    RegisterRequest, RegisterResponse, UserProfile,
};

use crate::{ServiceApi, ServiceError};

/// reqwest-backed client for the user and product services.
pub struct HttpServiceApi {
    client: Client,
    user_service_url: String,
    product_service_url: String,
}

impl HttpServiceApi {
    pub fn new(config: &SimulatorConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            user_service_url: config.user_service_url.trim_end_matches('/').to_string(),
            product_service_url: config.product_service_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_headers(&self, auth_token: Option<&AuthToken>) -> Result<HeaderMap, ServiceError> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            let value = HeaderValue::from_str(&token.bearer())
                .map_err(|e| ServiceError::InvalidHeader(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// Sends a request and fails unless the response carries the status
    /// `operation` succeeds with.
    async fn send<B>(
        &self,
        operation: Operation,
        method: Method,
        url: &str,
        auth_token: Option<&AuthToken>,
        body: Option<&B>,
    ) -> Result<Response, ServiceError>
    where
        B: Serialize + ?Sized,
    {
        debug!("Making {} request to {}", method, url);

        let headers = self.get_headers(auth_token)?;

        let mut req = self.client.request(method, url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        let expected = operation.expected_status();
        if status.as_u16() != expected {
            let error_text = response.text().await.unwrap_or_default();
            debug!("{} answered {}: {}", operation, status, error_text);

            return Err(ServiceError::UnexpectedStatus {
                expected,
                status: status.as_u16(),
                body: error_text,
            });
        }

        Ok(response)
    }

    async fn request<B, T>(
        &self,
        operation: Operation,
        method: Method,
        url: &str,
        auth_token: Option<&AuthToken>,
        body: Option<&B>,
    ) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(operation, method, url, auth_token, body).await?;
        let response_text = response.text().await?;

        let data = serde_json::from_str::<T>(&response_text)?;
        Ok(data)
    }
}

#[async_trait]
impl ServiceApi for HttpServiceApi {
    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ServiceError> {
        let url = format!("{}/register", self.user_service_url);

        self.request(Operation::Register, Method::POST, &url, None, Some(request))
            .await
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthToken, ServiceError> {
        let url = format!("{}/login", self.user_service_url);

        let response: LoginResponse = self
            .request(Operation::Login, Method::POST, &url, None, Some(request))
            .await?;

        Ok(AuthToken::from(response))
    }

    async fn fetch_profile(&self, token: &AuthToken) -> Result<UserProfile, ServiceError> {
        let url = format!("{}/profile", self.user_service_url);

        self.request::<(), _>(Operation::FetchProfile, Method::GET, &url, Some(token), None)
            .await
    }

    async fn list_products(&self, token: Option<&AuthToken>) -> Result<Vec<Product>, ServiceError> {
        self.request::<(), _>(
            Operation::ListProducts,
            Method::GET,
            &self.product_service_url,
            token,
            None,
        )
        .await
    }

    async fn create_product(
        &self,
        token: &AuthToken,
        product: &NewProduct,
    ) -> Result<Product, ServiceError> {
        self.request(
            Operation::CreateProduct,
            Method::POST,
            &self.product_service_url,
            Some(token),
            Some(product),
        )
        .await
    }

    async fn update_product(
        &self,
        token: &AuthToken,
        product_id: i64,
        update: &ProductUpdate,
    ) -> Result<Product, ServiceError> {
        let url = format!("{}/{}", self.product_service_url, product_id);

        self.request(Operation::UpdateProduct, Method::PUT, &url, Some(token), Some(update))
            .await
    }

    async fn delete_product(&self, token: &AuthToken, product_id: i64) -> Result<(), ServiceError> {
        let url = format!("{}/{}", self.product_service_url, product_id);

        self.send::<()>(Operation::DeleteProduct, Method::DELETE, &url, Some(token), None)
            .await?;

        Ok(())
    }
}
