//----------------------------------------------   Gateway webhooks  ----------------------------------------------------
//
// The one channel allowed to move order state. The contract is audit-first: every delivery is written to the
// webhook ledger before its signature is inspected, so even forged or broken deliveries leave a trace.

use actix_web::{web, HttpRequest, HttpResponse};
use log::*;
use razorpay_tools::{signature::verify_webhook_signature, RazorpayConfig};
use storefront_engine::{
    store_api::reconciliation_api::RESULT_INVALID_SIGNATURE,
    traits::WebhookLedger,
    ReconciliationApi,
};

use crate::{data_objects::JsonResponse, errors::ServerError, route};

pub const WEBHOOK_SIGNATURE_HEADER: &str = "X-Gateway-Signature";

route!(payment_webhook => Post "/payments/webhook" impl WebhookLedger);
/// Receives a gateway webhook delivery.
///
/// * 200 with the processing result when the signature verifies, whatever the event turns out to be. Replays,
///   unknown events and unknown orders are all acknowledged so the gateway stops retrying.
/// * 401 when the signature does not verify. The delivery is already in the ledger by then, closed with an
///   `InvalidSignature` result and no business mutation.
pub async fn payment_webhook<B: WebhookLedger>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<ReconciliationApi<B>>,
    config: web::Data<RazorpayConfig>,
) -> Result<HttpResponse, ServerError> {
    trace!("🛍️️ Received webhook delivery: {}", req.uri());
    let signature = req
        .headers()
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    // Audit before anything else. If this fails we have nowhere to record the delivery, so it is a 500.
    let entry = api.record_incoming(&body, &signature).await?;
    if !verify_webhook_signature(&body, &signature, config.webhook_secret.reveal()) {
        api.reject(entry.id, RESULT_INVALID_SIGNATURE).await?;
        warn!("🛍️️ Webhook delivery #{} failed signature verification", entry.id);
        return Err(ServerError::InvalidPaymentSignature);
    }
    let outcome = api.process(entry.id, &body).await?;
    info!("🛍️️ Webhook delivery #{} processed: {}", entry.id, outcome.result_string());
    Ok(HttpResponse::Ok().json(JsonResponse::success(outcome.result_string())))
}
