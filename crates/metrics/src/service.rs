use phonebot_models::BotError;
use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use tracing::{debug, instrument};

fn internal(e: impl ToString) -> BotError {
    BotError::Internal {
        reason: e.to_string(),
    }
}

pub struct MetricsService {
    registry: Registry,
    tool_calls_total: CounterVec,
    tool_errors_total: CounterVec,
    quotes_total: Counter,
    partial_quotes_total: Counter,
    leads_total: Counter,
    orders_total: Counter,
    reason_failures_total: Counter,
    emails_sent_total: Counter,
    emails_failed_total: Counter,
    quote_duration_ms: Histogram,
}

impl MetricsService {
    pub fn new() -> Result<Self, BotError> {
        let registry = Registry::new();

        let tool_calls_total = CounterVec::new(
            Opts::new("phonebot_tool_calls_total", "Tool executions requested by the agent"),
            &["tool"],
        )
        .map_err(internal)?;

        let tool_errors_total = CounterVec::new(
            Opts::new("phonebot_tool_errors_total", "Tool executions that failed"),
            &["tool", "error_type"],
        )
        .map_err(internal)?;

        let quotes_total =
            Counter::new("phonebot_quotes_total", "Total number of quotes priced").map_err(internal)?;

        let partial_quotes_total = Counter::new(
            "phonebot_partial_quotes_total",
            "Quotes priced with at least one short item",
        )
        .map_err(internal)?;

        let leads_total =
            Counter::new("phonebot_leads_total", "Total number of leads created").map_err(internal)?;

        let orders_total =
            Counter::new("phonebot_orders_total", "Total number of orders booked").map_err(internal)?;

        let reason_failures_total = Counter::new(
            "phonebot_reason_failures_total",
            "Reasoning calls that failed",
        )
        .map_err(internal)?;

        let emails_sent_total =
            Counter::new("phonebot_emails_sent_total", "Notification e-mails delivered")
                .map_err(internal)?;

        let emails_failed_total =
            Counter::new("phonebot_emails_failed_total", "Notification e-mails not delivered")
                .map_err(internal)?;

        let quote_duration_ms = Histogram::with_opts(
            HistogramOpts::new("phonebot_quote_duration_ms", "Time spent pricing a quote in milliseconds")
                .buckets(vec![0.1, 0.5, 1.0, 5.0, 10.0, 50.0, 100.0]),
        )
        .map_err(internal)?;

        registry.register(Box::new(tool_calls_total.clone())).map_err(internal)?;
        registry.register(Box::new(tool_errors_total.clone())).map_err(internal)?;
        registry.register(Box::new(quotes_total.clone())).map_err(internal)?;
        registry.register(Box::new(partial_quotes_total.clone())).map_err(internal)?;
        registry.register(Box::new(leads_total.clone())).map_err(internal)?;
        registry.register(Box::new(orders_total.clone())).map_err(internal)?;
        registry.register(Box::new(reason_failures_total.clone())).map_err(internal)?;
        registry.register(Box::new(emails_sent_total.clone())).map_err(internal)?;
        registry.register(Box::new(emails_failed_total.clone())).map_err(internal)?;
        registry.register(Box::new(quote_duration_ms.clone())).map_err(internal)?;

        Ok(Self {
            registry,
            tool_calls_total,
            tool_errors_total,
            quotes_total,
            partial_quotes_total,
            leads_total,
            orders_total,
            reason_failures_total,
            emails_sent_total,
            emails_failed_total,
            quote_duration_ms,
        })
    }

    pub fn record_tool_call(&self, tool: &str) {
        self.tool_calls_total.with_label_values(&[tool]).inc();
    }

    pub fn record_tool_error(&self, tool: &str, error_type: &str) {
        self.tool_errors_total
            .with_label_values(&[tool, error_type])
            .inc();
    }

    pub fn record_quote(&self, duration_ms: f64, partial: bool) {
        self.quotes_total.inc();
        if partial {
            self.partial_quotes_total.inc();
        }
        self.quote_duration_ms.observe(duration_ms);
    }

    pub fn record_lead(&self) {
        self.leads_total.inc();
    }

    pub fn record_order(&self) {
        self.orders_total.inc();
    }

    pub fn record_reason_failure(&self) {
        self.reason_failures_total.inc();
    }

    pub fn record_email(&self, delivered: bool) {
        if delivered {
            self.emails_sent_total.inc();
        } else {
            self.emails_failed_total.inc();
        }
    }

    #[instrument(skip(self))]
    pub async fn get_prometheus_metrics(&self) -> Result<String, BotError> {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();

        encoder.encode(&metric_families, &mut buffer).map_err(internal)?;
        debug!(families = metric_families.len(), "Encoded metrics");

        String::from_utf8(buffer).map_err(internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counters_show_up_in_text_output() {
        let metrics = MetricsService::new().unwrap();
        metrics.record_tool_call("quote");
        metrics.record_tool_call("quote");
        metrics.record_tool_error("quote", "BadRequest");
        metrics.record_quote(1.5, true);
        metrics.record_lead();
        metrics.record_email(false);

        let text = metrics.get_prometheus_metrics().await.unwrap();
        assert!(text.contains(r#"phonebot_tool_calls_total{tool="quote"} 2"#));
        assert!(text.contains(r#"phonebot_tool_errors_total{error_type="BadRequest",tool="quote"} 1"#));
        assert!(text.contains("phonebot_partial_quotes_total 1"));
        assert!(text.contains("phonebot_leads_total 1"));
        assert!(text.contains("phonebot_emails_failed_total 1"));
        assert!(text.contains("phonebot_emails_sent_total 0"));
        assert!(text.contains("phonebot_quote_duration_ms_count 1"));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = MetricsService::new().unwrap();
        let b = MetricsService::new().unwrap();
        a.record_order();
        assert_eq!(a.orders_total.get(), 1.0);
        assert_eq!(b.orders_total.get(), 0.0);
    }
}
