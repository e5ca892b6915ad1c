use phonebot_api::AppState;
use phonebot_metrics::MetricsService;
use phonebot_models::{AvailabilityIn, BookIn, LeadIn, QuoteIn, QuoteItemIn};
use phonebot_testsupport::*;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct Daemon {
    base_url: String,
    stop: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
    _tenants: TenantDir,
}

impl Daemon {
    async fn kill(mut self) -> anyhow::Result<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.handle.await?;
        Ok(())
    }
}

async fn spawn_daemon() -> anyhow::Result<Daemon> {
    let tenants = sample_tenant_dir()?;
    let mut config = phonebot_models::Config::default();
    config.tenants.dir = tenants.path().to_string_lossy().to_string();
    config.admin.api_key = "smoke-admin".to_string();

    let state = AppState::new(
        config,
        Arc::new(ScriptedReasoner::say("Hello from the smoke test")),
        Arc::new(EchoSlotExtractor),
        Arc::new(RecordingNotifier::new()),
        None,
        Arc::new(MetricsService::new()?),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);
    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let shutdown = async {
            let _ = stopped.await;
        };
        if let Err(e) = phonebot_api::serve(listener, state, shutdown).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(Daemon {
        base_url,
        stop: Some(stop),
        handle,
        _tenants: tenants,
    })
}

fn chairs(qty: u32) -> QuoteItemIn {
    QuoteItemIn {
        id: Some(CHAIR_ID),
        name: None,
        qty,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn smoke_test() -> anyhow::Result<()> {
    let daemon = spawn_daemon().await?;
    let client = BotClient::new(daemon.base_url.clone()).with_tenant(TENANT);

    let health = client.health().await?;
    assert!(health.ok);
    assert_eq!(health.tenants, vec![TENANT.to_string()]);

    let (quote, partial) = client
        .quote(&QuoteIn {
            date: QUIET_WEDNESDAY.to_string(),
            zip: "91367".to_string(),
            items: vec![
                chairs(50),
                QuoteItemIn {
                    id: None,
                    name: Some("table 60\" round".to_string()),
                    qty: 5,
                },
            ],
        })
        .await?;
    assert!(!partial);
    assert_eq!(quote.total, 331.82);

    let availability = client
        .check_availability(&AvailabilityIn {
            date: BUSY_THURSDAY.to_string(),
            items: vec![chairs(60)],
        })
        .await?;
    assert!(!availability.available);
    assert_eq!(availability.shortages[0].available, 50);

    let metrics = client.metrics().await?;
    assert!(metrics.contains("phonebot_quotes_total"));

    daemon.kill().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn lead_then_booking_over_http() -> anyhow::Result<()> {
    let daemon = spawn_daemon().await?;
    let client = BotClient::new(daemon.base_url.clone());

    let lead = client
        .create_lead(&LeadIn {
            name: "Alice".to_string(),
            phone: "818-555-1234".to_string(),
            email: None,
            quote_id: None,
        })
        .await?;
    let order = client
        .book(&BookIn {
            quote_id: lead.lead_id,
            payment_token: "tok_demo".to_string(),
        })
        .await?;
    assert_ne!(order.order_id, lead.lead_id);

    daemon.kill().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_inventory_over_http() -> anyhow::Result<()> {
    let daemon = spawn_daemon().await?;
    let client = BotClient::new(daemon.base_url.clone())
        .with_tenant(TENANT)
        .with_admin_key("smoke-admin");

    let before = client.list_inventory().await?;
    assert_eq!(before.len(), 3);

    let item = client
        .add_item(&phonebot_models::ItemCreate {
            name: "Dance Floor".to_string(),
            daily_price: 400.0,
            qty: 1,
        })
        .await?;
    let deleted = client.delete_item(item.id).await?;
    assert!(deleted.ok);
    assert_eq!(client.list_inventory().await?.len(), 3);

    daemon.kill().await?;
    Ok(())
}
