use ::tracing::{error, info, warn};
use phonebot_models::BotError;

pub struct TracingService;

impl TracingService {
    pub fn init() -> Result<(), Box<dyn std::error::Error>> {
        tracing_subscriber::fmt()
            .json()
            .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
            .try_init()
            .map_err(|e| e as Box<dyn std::error::Error>)?;

        Ok(())
    }

    pub fn log_quote_priced(tenant: &str, items: usize, total: f64, partial: bool) {
        info!(
            tenant = %tenant,
            items = items,
            total = total,
            partial = partial,
            "Quote priced"
        );
    }

    pub fn log_lead_created(tenant: &str, lead_id: &str, source: &str) {
        info!(
            tenant = %tenant,
            lead_id = %lead_id,
            source = %source,
            "Lead created"
        );
    }

    pub fn log_order_created(order_id: &str, quote_id: &str) {
        info!(
            order_id = %order_id,
            quote_id = %quote_id,
            "Order booked"
        );
    }

    pub fn log_tool_failed(tenant: &str, tool: &str, err: &BotError) {
        warn!(
            tenant = %tenant,
            tool = %tool,
            error_type = %err.error_type(),
            error_message = %err,
            "Tool failed"
        );
    }

    pub fn log_reason_failed(tenant: &str, provider: &str, kind: &str, message: &str) {
        error!(
            tenant = %tenant,
            provider = %provider,
            error_type = %kind,
            error_message = %message,
            "Reasoning failed"
        );
    }

    pub fn log_email(to: &str, subject: &str, delivered: bool) {
        if delivered {
            info!(to = %to, subject = %subject, "Notification sent");
        } else {
            warn!(to = %to, subject = %subject, "Notification not delivered");
        }
    }

    pub fn log_call_turn(tenant: &str, call_id: &str, step: u32, complete: bool) {
        info!(
            tenant = %tenant,
            call_id = %call_id,
            step = step,
            complete = complete,
            "Call turn handled"
        );
    }

    pub fn log_inventory_changed(tenant: &str, action: &str, item_id: &str) {
        info!(
            tenant = %tenant,
            action = %action,
            item_id = %item_id,
            "Inventory changed"
        );
    }
}
