mod helpers;

mod carts;
mod checkout;
mod webhooks;
