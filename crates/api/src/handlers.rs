use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use phonebot_control::{incomplete_lead_email, lead_email, resolve_quote_items, Tool};
use phonebot_metrics::TracingService;
use phonebot_models::{
    AvailabilityIn, AvailabilityOut, BookIn, BookOut, BotError, CallTurnRequest,
    CallTurnResponse, DeleteItemResponse, ErrorShape, HealthResponse, ItemCreate, ItemDef,
    ItemUpdate, LeadIn, LeadOut, MoneyOut, QuoteIn, ReasonRequest, SpeechRequest, Thought,
    SHORTAGE_NOTE,
};
use serde_json::json;
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::state::{caller_number, AppState};

pub type ApiError = (StatusCode, Json<ErrorShape>);

pub fn api_error(e: &BotError) -> ApiError {
    (
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(e.to_error_shape()),
    )
}

fn fail(context: &str, e: BotError) -> ApiError {
    if e.http_status() >= 500 {
        error!("{}: {}", context, e);
    } else {
        warn!("{}: {}", context, e);
    }
    api_error(&e)
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

// ---------- health ----------

#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        tenants: state.tenants.list_tenants(),
    })
}

#[instrument(skip(state))]
pub async fn metrics(State(state): State<AppState>) -> Result<String, StatusCode> {
    match state.metrics.get_prometheus_metrics().await {
        Ok(metrics) => Ok(metrics),
        Err(e) => {
            error!("Failed to get metrics: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// ---------- reasoning ----------

#[instrument(skip(state, headers, req))]
pub async fn reason(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ReasonRequest>,
) -> Result<Response, ApiError> {
    let tenant = state
        .resolve_tenant(&headers)
        .await
        .map_err(|e| fail("Failed to resolve tenant", e))?;
    let business = tenant.engine.read().await.config().business.clone();

    match state.agent.think(&business, &req).await {
        Ok(thought) => Ok(Json(thought).into_response()),
        Err(e) => {
            state.metrics.record_reason_failure();
            TracingService::log_reason_failed(
                &tenant.name,
                state.agent.provider_name(),
                e.kind(),
                &e.to_string(),
            );
            Ok(error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{}: {}", e.kind(), e),
            ))
        }
    }
}

#[instrument(skip(state, headers, req))]
pub async fn reason_and_act(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ReasonRequest>,
) -> Result<Response, ApiError> {
    let tenant = state
        .resolve_tenant(&headers)
        .await
        .map_err(|e| fail("Failed to resolve tenant", e))?;
    let business = tenant.engine.read().await.config().business.clone();

    let thought = match state.agent.think(&business, &req).await {
        Ok(thought) => thought,
        Err(e) => {
            state.metrics.record_reason_failure();
            TracingService::log_reason_failed(
                &tenant.name,
                state.agent.provider_name(),
                e.kind(),
                &e.to_string(),
            );
            return Ok(error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("reason error: {}", e),
            ));
        }
    };

    let tool = thought.tool.clone();
    if let Some(tool) = tool.as_deref() {
        state.metrics.record_tool_call(tool);
    }
    let engine = tenant.engine.read().await;
    match state.agent.act(&engine, thought) {
        Ok(acted) => {
            if acted.followup_quote.is_some() {
                state.metrics.record_tool_call(Tool::Quote.as_str());
            }
            Ok(Json(acted).into_response())
        }
        Err(e) => {
            let tool = tool.unwrap_or_default();
            state.metrics.record_tool_error(&tool, e.error_type());
            TracingService::log_tool_failed(&tenant.name, &tool, &e);
            Err(api_error(&e))
        }
    }
}

/// Lead-capture conversation: greets on an empty history, forwards the
/// model's reply, and e-mails the business when a lead is created or when
/// the model can't be reached.
#[instrument(skip(state, headers, req))]
pub async fn dialog(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ReasonRequest>,
) -> Result<Response, ApiError> {
    let tenant = state
        .resolve_tenant(&headers)
        .await
        .map_err(|e| fail("Failed to resolve tenant", e))?;
    let tenant_config = tenant.engine.read().await.config().clone();
    let caller = caller_number(&headers);

    if req.messages.is_empty() {
        return Ok(Json(Thought {
            say: state.opening_greeting(&tenant_config),
            tool: None,
            args: None,
        })
        .into_response());
    }

    let business_name = state.business_name(&tenant_config);
    let to = state.notifications_email(&tenant_config);

    let thought = match state.agent.think(&tenant_config.business, &req).await {
        Ok(thought) => thought,
        Err(e) => {
            state.metrics.record_reason_failure();
            TracingService::log_reason_failed(
                &tenant.name,
                state.agent.provider_name(),
                e.kind(),
                &e.to_string(),
            );
            let (subject, body) =
                incomplete_lead_email(&business_name, caller.as_deref(), req.last_user_message());
            let delivered = state.notifier.send_email(&to, &subject, &body).await;
            state.metrics.record_email(delivered);
            TracingService::log_email(&to, &subject, delivered);
            return Ok(error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("reason error: {}", e),
            ));
        }
    };

    let args = thought.args_or_empty();
    let mut tool_result = None;
    if let Some(tool) = thought.tool.as_deref().filter(|t| !t.trim().is_empty()) {
        state.metrics.record_tool_call(tool);
        let outcome = {
            let engine = tenant.engine.read().await;
            state.agent.runner().run(&engine, tool, &args)
        };
        match outcome {
            Ok(result) => {
                if tool == Tool::CreateLead.as_str() {
                    state.metrics.record_lead();
                    let lead_id = result["lead_id"].as_str().unwrap_or_default();
                    TracingService::log_lead_created(&tenant.name, lead_id, "dialog");

                    let (subject, body) = lead_email(&business_name, caller.as_deref(), &args);
                    let delivered = state.notifier.send_email(&to, &subject, &body).await;
                    state.metrics.record_email(delivered);
                    TracingService::log_email(&to, &subject, delivered);
                }
                tool_result = Some(result);
            }
            Err(e) => {
                state.metrics.record_tool_error(tool, e.error_type());
                TracingService::log_tool_failed(&tenant.name, tool, &e);
                tool_result = Some(json!({ "error": e.to_string() }));
            }
        }
    }

    Ok(Json(json!({
        "say": thought.say,
        "tool": thought.tool,
        "args": thought.args,
        "tool_result": tool_result,
    }))
    .into_response())
}

// ---------- availability & quotes ----------

#[instrument(skip(state, headers, inp))]
pub async fn check_availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(inp): Json<AvailabilityIn>,
) -> Result<Json<AvailabilityOut>, ApiError> {
    let tenant = state
        .resolve_tenant(&headers)
        .await
        .map_err(|e| fail("Failed to resolve tenant", e))?;
    let engine = tenant.engine.read().await;

    let items = resolve_quote_items(&engine, &inp.items)
        .map_err(|e| fail("Failed to resolve items", e))?;
    let shortages = engine
        .check_availability(&inp.date, &items)
        .map_err(|e| fail("Failed to check availability", e))?;
    Ok(Json(AvailabilityOut::from_shortages(shortages)))
}

#[instrument(skip(state, headers, inp))]
pub async fn quote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(inp): Json<QuoteIn>,
) -> Result<(StatusCode, Json<MoneyOut>), ApiError> {
    let tenant = state
        .resolve_tenant(&headers)
        .await
        .map_err(|e| fail("Failed to resolve tenant", e))?;
    let engine = tenant.engine.read().await;
    let started = Instant::now();

    let items = resolve_quote_items(&engine, &inp.items)
        .map_err(|e| fail("Failed to resolve items", e))?;
    let shortages = engine
        .check_availability(&inp.date, &items)
        .map_err(|e| fail("Failed to check availability", e))?;
    let mut priced = engine
        .price(&inp.date, &inp.zip, &items)
        .map_err(|e| fail("Failed to price quote", e))?;

    let partial = !shortages.is_empty();
    state
        .metrics
        .record_quote(started.elapsed().as_secs_f64() * 1000.0, partial);
    TracingService::log_quote_priced(&tenant.name, items.len(), priced.total, partial);

    if partial {
        priced.note = Some(SHORTAGE_NOTE.to_string());
        return Ok((StatusCode::PARTIAL_CONTENT, Json(priced)));
    }
    Ok((StatusCode::OK, Json(priced)))
}

// ---------- leads & booking ----------

#[instrument(skip(state, inp))]
pub async fn create_lead(
    State(state): State<AppState>,
    Json(inp): Json<LeadIn>,
) -> Json<LeadOut> {
    let lead = state.repo.create_lead(
        &inp.name,
        &inp.phone,
        inp.email,
        inp.quote_id.map(|q| q.to_string()),
    );
    state.metrics.record_lead();
    Json(LeadOut {
        lead_id: lead.lead_id,
    })
}

#[instrument(skip(state, inp))]
pub async fn book(State(state): State<AppState>, Json(inp): Json<BookIn>) -> Json<BookOut> {
    // payment tokens are accepted as-is; nothing is charged
    let order = state.repo.create_order(&inp.quote_id.to_string());
    state.metrics.record_order();
    TracingService::log_order_created(&order.order_id.to_string(), &inp.quote_id.to_string());
    Json(BookOut {
        order_id: order.order_id,
    })
}

// ---------- call workflow ----------

#[instrument(skip(state, headers, inp))]
pub async fn call_turn(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
    headers: HeaderMap,
    Json(inp): Json<CallTurnRequest>,
) -> Result<Json<CallTurnResponse>, ApiError> {
    let tenant = state
        .resolve_tenant(&headers)
        .await
        .map_err(|e| fail("Failed to resolve tenant", e))?;
    let tenant_config = tenant.engine.read().await.config().clone();
    let workflow = state.workflow_for(&tenant_config);

    let caller = caller_number(&headers);
    let session = state.sessions.get_or_create(&call_id, caller.as_deref()).await;
    let mut session = session.lock().await;

    let step = workflow.handle_step(&mut session, &inp.text).await;
    if let Some(delivered) = step.email_delivered {
        state.metrics.record_email(delivered);
    }
    TracingService::log_call_turn(&tenant.name, &call_id, session.step_index, step.complete);

    Ok(Json(CallTurnResponse {
        say: step.say,
        complete: step.complete,
        slots: session.slot_map(),
    }))
}

#[instrument(skip(state))]
pub async fn end_call(State(state): State<AppState>, Path(call_id): Path<String>) -> StatusCode {
    if state.sessions.remove(&call_id) {
        info!(call_id = %call_id, "Call session ended");
    }
    StatusCode::NO_CONTENT
}

// ---------- speech ----------

#[instrument(skip(state, inp))]
pub async fn speech(
    State(state): State<AppState>,
    Json(inp): Json<SpeechRequest>,
) -> Result<Response, ApiError> {
    let synthesizer = state.speech.as_ref().ok_or_else(|| {
        fail(
            "Speech requested",
            BotError::Internal {
                reason: "speech synthesis is not configured".to_string(),
            },
        )
    })?;

    let path = synthesizer
        .synthesize(&inp.text, inp.filename.as_deref())
        .await
        .map_err(|e| {
            fail(
                "Failed to synthesize speech",
                BotError::Internal {
                    reason: e.to_string(),
                },
            )
        })?;
    let audio = tokio::fs::read(&path)
        .await
        .map_err(|e| fail("Failed to read synthesized audio", BotError::Io(e)))?;

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response())
}

// ---------- admin: inventory ----------

#[instrument(skip(state, headers))]
pub async fn admin_list_inventory(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ItemDef>>, ApiError> {
    state
        .check_admin(&headers)
        .map_err(|e| fail("Admin check failed", e))?;
    let tenant = state
        .resolve_tenant(&headers)
        .await
        .map_err(|e| fail("Failed to resolve tenant", e))?;
    let engine = tenant.engine.read().await;
    Ok(Json(engine.list_items()))
}

#[instrument(skip(state, headers, data))]
pub async fn admin_create_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(data): Json<ItemCreate>,
) -> Result<Json<ItemDef>, ApiError> {
    state
        .check_admin(&headers)
        .map_err(|e| fail("Admin check failed", e))?;
    let tenant = state
        .resolve_tenant(&headers)
        .await
        .map_err(|e| fail("Failed to resolve tenant", e))?;

    let mut engine = tenant.engine.write().await;
    let id = engine.add_item(&data.name, data.daily_price, data.qty);
    engine
        .save()
        .await
        .map_err(|e| fail("Failed to save tenant file", e))?;
    TracingService::log_inventory_changed(&tenant.name, "create", &id.to_string());

    Ok(Json(ItemDef {
        id,
        name: data.name,
        daily_price: data.daily_price,
        qty: data.qty,
    }))
}

#[instrument(skip(state, headers, data))]
pub async fn admin_update_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    headers: HeaderMap,
    Json(data): Json<ItemUpdate>,
) -> Result<Json<ItemDef>, ApiError> {
    state
        .check_admin(&headers)
        .map_err(|e| fail("Admin check failed", e))?;
    let tenant = state
        .resolve_tenant(&headers)
        .await
        .map_err(|e| fail("Failed to resolve tenant", e))?;

    let mut engine = tenant.engine.write().await;
    let updated = engine
        .update_item(&item_id, data.name.as_deref(), data.daily_price, data.qty)
        .map_err(|e| fail("Failed to update item", e))?;
    engine
        .save()
        .await
        .map_err(|e| fail("Failed to save tenant file", e))?;
    TracingService::log_inventory_changed(&tenant.name, "update", &item_id.to_string());

    Ok(Json(updated))
}

#[instrument(skip(state, headers))]
pub async fn admin_delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<DeleteItemResponse>, ApiError> {
    state
        .check_admin(&headers)
        .map_err(|e| fail("Admin check failed", e))?;
    let tenant = state
        .resolve_tenant(&headers)
        .await
        .map_err(|e| fail("Failed to resolve tenant", e))?;

    let mut engine = tenant.engine.write().await;
    engine
        .delete_item(&item_id)
        .map_err(|e| fail("Failed to delete item", e))?;
    engine
        .save()
        .await
        .map_err(|e| fail("Failed to save tenant file", e))?;
    TracingService::log_inventory_changed(&tenant.name, "delete", &item_id.to_string());

    Ok(Json(DeleteItemResponse {
        ok: true,
        deleted: item_id.to_string(),
    }))
}
