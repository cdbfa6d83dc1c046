//! HMAC-SHA256 signature checks for the two gateway channels.
//!
//! The client-side verify call signs `"{order_id}|{payment_id}"` with the API key secret and sends a lowercase hex
//! digest. Webhook deliveries sign the raw request body with the webhook secret; depending on gateway configuration
//! the header carries either a lowercase hex digest or a base64 one, so both representations are accepted.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn hmac_sha256(secret: &str, data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Verify the signature the client submits after completing a payment in the gateway's checkout widget.
///
/// A `true` result is a *tentative* confirmation only. It must never substitute for the webhook channel.
pub fn verify_payment_signature(order_id: &str, payment_id: &str, signature: &str, key_secret: &str) -> bool {
    if signature.is_empty() || key_secret.is_empty() {
        return false;
    }
    let payload = format!("{order_id}|{payment_id}");
    let expected = hex::encode(hmac_sha256(key_secret, payload.as_bytes()));
    expected.eq_ignore_ascii_case(signature)
}

/// Verify the signature header of a webhook delivery against the raw body bytes.
pub fn verify_webhook_signature(body: &[u8], signature_header: &str, webhook_secret: &str) -> bool {
    if signature_header.is_empty() || webhook_secret.is_empty() {
        return false;
    }
    let digest = hmac_sha256(webhook_secret, body);
    if hex::encode(&digest).eq_ignore_ascii_case(signature_header) {
        return true;
    }
    base64::encode(&digest) == signature_header
}

/// The hex digest a well-behaved sender would attach to `body`. Used by tests and tooling.
pub fn webhook_signature_hex(body: &[u8], webhook_secret: &str) -> String {
    hex::encode(hmac_sha256(webhook_secret, body))
}

/// The base64 form of the webhook signature.
pub fn webhook_signature_base64(body: &[u8], webhook_secret: &str) -> String {
    base64::encode(hmac_sha256(webhook_secret, body))
}

/// The hex signature for the client verify payload. Used by tests and tooling.
pub fn payment_signature_hex(order_id: &str, payment_id: &str, key_secret: &str) -> String {
    let payload = format!("{order_id}|{payment_id}");
    hex::encode(hmac_sha256(key_secret, payload.as_bytes()))
}
