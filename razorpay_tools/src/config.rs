use log::*;
use storefront_common::Secret;

#[derive(Debug, Clone, Default)]
pub struct RazorpayConfig {
    /// The gateway API host, e.g. "api.razorpay.com"
    pub host: String,
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub webhook_secret: Secret<String>,
}

impl RazorpayConfig {
    pub fn new_from_env_or_default() -> Self {
        let host = std::env::var("SFS_RAZORPAY_HOST").unwrap_or_else(|_| "api.razorpay.com".to_string());
        let key_id = std::env::var("SFS_RAZORPAY_KEY").unwrap_or_else(|_| {
            warn!("SFS_RAZORPAY_KEY not set, using (probably useless) default");
            "rzp_test_0000000000".to_string()
        });
        let key_secret = Secret::new(std::env::var("SFS_RAZORPAY_SECRET").unwrap_or_else(|_| {
            warn!("SFS_RAZORPAY_SECRET not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        let webhook_secret = Secret::new(std::env::var("SFS_WEBHOOK_SECRET").unwrap_or_else(|_| {
            warn!("SFS_WEBHOOK_SECRET not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        Self { host, key_id, key_secret, webhook_secret }
    }
}
