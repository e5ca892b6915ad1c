use anyhow::{anyhow, Result};
use phonebot_models::{AvailabilityIn, ItemCreate, ItemUpdate, QuoteIn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;

pub struct PhonebotClient {
    client: Client,
    base_url: String,
    tenant: Option<String>,
    admin_key: Option<String>,
}

impl PhonebotClient {
    pub fn new(base_url: String, tenant: Option<String>, admin_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tenant,
            admin_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn scoped(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = match &self.tenant {
            Some(t) => builder.header("X-Tenant", t),
            None => builder,
        };
        match &self.admin_key {
            Some(k) => builder.header("X-Admin-Key", k),
            None => builder,
        }
    }

    async fn into_json(response: Response, action: &str) -> Result<(StatusCode, Value)> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("{} failed ({}): {}", action, status, error_text));
        }
        let body = response.json().await?;
        Ok((status, body))
    }

    pub async fn health_check(&self) -> Result<Value> {
        let response = self.client.get(self.url("/healthz")).send().await?;
        Ok(Self::into_json(response, "Health check").await?.1)
    }

    /// Returns the quote and whether the server flagged it as partial (206).
    pub async fn quote(&self, request: &QuoteIn) -> Result<(Value, bool)> {
        let response = self
            .scoped(self.client.post(self.url("/quote")))
            .json(request)
            .send()
            .await?;
        let (status, body) = Self::into_json(response, "Quote").await?;
        Ok((body, status == StatusCode::PARTIAL_CONTENT))
    }

    pub async fn check_availability(&self, request: &AvailabilityIn) -> Result<Value> {
        let response = self
            .scoped(self.client.post(self.url("/check_availability")))
            .json(request)
            .send()
            .await?;
        Ok(Self::into_json(response, "Availability check").await?.1)
    }

    pub async fn list_inventory(&self) -> Result<Value> {
        let response = self
            .scoped(self.client.get(self.url("/admin/inventory")))
            .send()
            .await?;
        Ok(Self::into_json(response, "List inventory").await?.1)
    }

    pub async fn add_item(&self, item: &ItemCreate) -> Result<Value> {
        let response = self
            .scoped(self.client.post(self.url("/admin/inventory")))
            .json(item)
            .send()
            .await?;
        Ok(Self::into_json(response, "Add item").await?.1)
    }

    pub async fn update_item(&self, item_id: &str, update: &ItemUpdate) -> Result<Value> {
        let response = self
            .scoped(self.client.put(self.url(&format!("/admin/inventory/{}", item_id))))
            .json(update)
            .send()
            .await?;
        Ok(Self::into_json(response, "Update item").await?.1)
    }

    pub async fn delete_item(&self, item_id: &str) -> Result<Value> {
        let response = self
            .scoped(self.client.delete(self.url(&format!("/admin/inventory/{}", item_id))))
            .send()
            .await?;
        Ok(Self::into_json(response, "Delete item").await?.1)
    }
}
