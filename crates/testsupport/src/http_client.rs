use anyhow::Result;
use phonebot_models::{
    AvailabilityIn, AvailabilityOut, BookIn, BookOut, CallTurnResponse, DeleteItemResponse,
    HealthResponse, ItemCreate, ItemDef, ItemUpdate, LeadIn, LeadOut, MoneyOut, QuoteIn,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use uuid::Uuid;

/// Typed client for the Phonebot HTTP API, scoped to one tenant.
pub struct BotClient {
    client: Client,
    base_url: String,
    tenant: Option<String>,
    admin_key: Option<String>,
}

impl BotClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tenant: None,
            admin_key: None,
        }
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn with_admin_key(mut self, key: impl Into<String>) -> Self {
        self.admin_key = Some(key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn scoped(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(tenant) = &self.tenant {
            request = request.header("X-Tenant", tenant);
        }
        if let Some(key) = &self.admin_key {
            request = request.header("X-Admin-Key", key);
        }
        request
    }

    async fn expect_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            anyhow::bail!("{} failed ({}): {}", what, status, error_text);
        }
        Ok(response.json().await?)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self.client.get(self.url("/healthz")).send().await?;
        Self::expect_json(response, "Health check").await
    }

    pub async fn metrics(&self) -> Result<String> {
        let response = self.client.get(self.url("/metrics")).send().await?;
        Ok(response.error_for_status()?.text().await?)
    }

    pub async fn check_availability(&self, request: &AvailabilityIn) -> Result<AvailabilityOut> {
        let response = self
            .scoped(self.client.post(self.url("/check_availability")))
            .json(request)
            .send()
            .await?;
        Self::expect_json(response, "Check availability").await
    }

    /// Returns the quote and whether the service reported a shortage (206).
    pub async fn quote(&self, request: &QuoteIn) -> Result<(MoneyOut, bool)> {
        let response = self
            .scoped(self.client.post(self.url("/quote")))
            .json(request)
            .send()
            .await?;
        let partial = response.status().as_u16() == 206;
        Ok((Self::expect_json(response, "Quote").await?, partial))
    }

    pub async fn create_lead(&self, request: &LeadIn) -> Result<LeadOut> {
        let response = self
            .scoped(self.client.post(self.url("/create_lead")))
            .json(request)
            .send()
            .await?;
        Self::expect_json(response, "Create lead").await
    }

    pub async fn book(&self, request: &BookIn) -> Result<BookOut> {
        let response = self
            .scoped(self.client.post(self.url("/book")))
            .json(request)
            .send()
            .await?;
        Self::expect_json(response, "Book").await
    }

    pub async fn call_turn(
        &self,
        call_id: &str,
        text: &str,
        caller_number: Option<&str>,
    ) -> Result<CallTurnResponse> {
        let mut request = self
            .scoped(self.client.post(self.url(&format!("/calls/{}/turns", call_id))))
            .json(&json!({ "text": text }));
        if let Some(number) = caller_number {
            request = request.header("X-Caller-Number", number);
        }
        Self::expect_json(request.send().await?, "Call turn").await
    }

    pub async fn end_call(&self, call_id: &str) -> Result<()> {
        let response = self
            .scoped(self.client.delete(self.url(&format!("/calls/{}", call_id))))
            .send()
            .await?;
        if !response.status().is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("End call failed: {}", error_text);
        }
        Ok(())
    }

    pub async fn dialog(&self, body: &Value) -> Result<(u16, Value)> {
        let response = self
            .scoped(self.client.post(self.url("/dialog")))
            .json(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        Ok((status, response.json().await?))
    }

    pub async fn list_inventory(&self) -> Result<Vec<ItemDef>> {
        let response = self
            .scoped(self.client.get(self.url("/admin/inventory")))
            .send()
            .await?;
        Self::expect_json(response, "List inventory").await
    }

    pub async fn add_item(&self, request: &ItemCreate) -> Result<ItemDef> {
        let response = self
            .scoped(self.client.post(self.url("/admin/inventory")))
            .json(request)
            .send()
            .await?;
        Self::expect_json(response, "Add item").await
    }

    pub async fn update_item(&self, id: Uuid, request: &ItemUpdate) -> Result<ItemDef> {
        let response = self
            .scoped(self.client.put(self.url(&format!("/admin/inventory/{}", id))))
            .json(request)
            .send()
            .await?;
        Self::expect_json(response, "Update item").await
    }

    pub async fn delete_item(&self, id: Uuid) -> Result<DeleteItemResponse> {
        let response = self
            .scoped(self.client.delete(self.url(&format!("/admin/inventory/{}", id))))
            .send()
            .await?;
        Self::expect_json(response, "Delete item").await
    }
}
