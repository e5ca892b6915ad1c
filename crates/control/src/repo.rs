use chrono::Utc;
use dashmap::DashMap;
use phonebot_models::{Lead, Order};
use tracing::info;
use uuid::Uuid;

/// Leads and orders captured during the process lifetime.
#[derive(Default)]
pub struct Repo {
    leads: DashMap<Uuid, Lead>,
    orders: DashMap<Uuid, Order>,
}

impl Repo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_lead(
        &self,
        name: &str,
        phone: &str,
        email: Option<String>,
        quote_id: Option<String>,
    ) -> Lead {
        let lead = Lead {
            lead_id: Uuid::new_v4(),
            name: name.to_string(),
            phone: phone.to_string(),
            email,
            quote_id,
            created_at: Utc::now(),
        };
        info!(lead_id = %lead.lead_id, "Lead created");
        self.leads.insert(lead.lead_id, lead.clone());
        lead
    }

    pub fn create_order(&self, quote_id: &str) -> Order {
        let order = Order {
            order_id: Uuid::new_v4(),
            quote_id: quote_id.to_string(),
            created_at: Utc::now(),
        };
        info!(order_id = %order.order_id, quote_id = %quote_id, "Order created");
        self.orders.insert(order.order_id, order.clone());
        order
    }

    pub fn get_lead(&self, lead_id: &Uuid) -> Option<Lead> {
        self.leads.get(lead_id).map(|l| l.clone())
    }

    pub fn get_order(&self, order_id: &Uuid) -> Option<Order> {
        self.orders.get(order_id).map(|o| o.clone())
    }

    pub fn lead_count(&self) -> usize {
        self.leads.len()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leads_and_orders_are_retrievable() {
        let repo = Repo::new();
        let lead = repo.create_lead("Alice", "555-1234", None, Some("q-1".into()));
        let order = repo.create_order("q-1");

        assert_eq!(repo.get_lead(&lead.lead_id).unwrap().name, "Alice");
        assert_eq!(repo.get_order(&order.order_id).unwrap().quote_id, "q-1");
        assert_eq!(repo.lead_count(), 1);
        assert_eq!(repo.order_count(), 1);
        assert!(repo.get_lead(&Uuid::new_v4()).is_none());
    }
}
