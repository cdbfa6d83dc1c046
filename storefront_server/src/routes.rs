//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use razorpay_tools::{signature::verify_payment_signature, RazorpayApi};
use storefront_engine::{
    db_types::{NewOrder, PaymentMethod, ShopperId},
    traits::{CartManagement, CheckoutDatabase, ProductCatalog},
    CartApi,
    CheckoutApi,
};
use uuid::Uuid;

use crate::{
    auth::{session_id_from_request, ShopperIdentity},
    data_objects::{
        AddItemRequest,
        CheckoutRequest,
        CheckoutResponse,
        JsonResponse,
        VerifyPaymentRequest,
        VerifyPaymentResponse,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(products => Get "/products" impl CheckoutDatabase, ProductCatalog);
pub async fn products<B>(api: web::Data<CheckoutApi<B>>) -> Result<HttpResponse, ServerError>
where B: CheckoutDatabase + ProductCatalog {
    let products = api.products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product_by_id => Get "/products/{id}" impl CheckoutDatabase, ProductCatalog);
pub async fn product_by_id<B>(path: web::Path<i64>, api: web::Data<CheckoutApi<B>>) -> Result<HttpResponse, ServerError>
where B: CheckoutDatabase + ProductCatalog {
    let id = path.into_inner();
    let product = api.product(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Product {id}")))?;
    Ok(HttpResponse::Ok().json(product))
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(my_cart => Get "/cart" impl CartManagement);
pub async fn my_cart<B: CartManagement>(
    shopper: ShopperIdentity,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let lines = api.cart(&shopper.0).await?;
    Ok(HttpResponse::Ok().json(lines))
}

route!(add_cart_item => Post "/cart/items" impl CartManagement);
pub async fn add_cart_item<B: CartManagement>(
    shopper: ShopperIdentity,
    body: web::Json<AddItemRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    trace!("💻️ {} adds {} x product #{}", shopper.0, req.quantity, req.product_id);
    api.add_item(&shopper.0, req.product_id, req.quantity).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Item added.")))
}

route!(remove_cart_item => Delete "/cart/items/{product_id}" impl CartManagement);
pub async fn remove_cart_item<B: CartManagement>(
    shopper: ShopperIdentity,
    path: web::Path<i64>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    api.remove_item(&shopper.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Item removed.")))
}

route!(increase_cart_item => Post "/cart/items/{product_id}/increase" impl CartManagement);
pub async fn increase_cart_item<B: CartManagement>(
    shopper: ShopperIdentity,
    path: web::Path<i64>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    api.increase_item(&shopper.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Quantity increased.")))
}

route!(decrease_cart_item => Post "/cart/items/{product_id}/decrease" impl CartManagement);
pub async fn decrease_cart_item<B: CartManagement>(
    shopper: ShopperIdentity,
    path: web::Path<i64>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    api.decrease_item(&shopper.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Quantity decreased.")))
}

route!(clear_cart => Post "/cart/clear" impl CartManagement);
pub async fn clear_cart<B: CartManagement>(
    shopper: ShopperIdentity,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    api.clear(&shopper.0).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Cart cleared.")))
}

route!(merge_cart => Post "/cart/merge" impl CartManagement);
/// Runs the login merge. The caller must be a signed-in customer and must still be carrying the session id of the
/// anonymous cart being handed over.
pub async fn merge_cart<B: CartManagement>(
    req: HttpRequest,
    shopper: ShopperIdentity,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = match &shopper.0 {
        ShopperId::Customer(id) => id.clone(),
        ShopperId::Guest(_) => return Err(ServerError::CouldNotValidateAuthToken),
    };
    let session_id = session_id_from_request(&req).ok_or(ServerError::NoShopperIdentity)?;
    let merged = api.merge_on_login(&session_id, &user_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("{merged} line(s) merged."))))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl CheckoutDatabase, ProductCatalog);
/// Converts the shopper's cart into an order.
///
/// For online payments, a remote order is also created with the gateway and its id attached; the client hands that
/// id to the checkout widget. For cash on delivery the order is final immediately.
pub async fn checkout<B>(
    shopper: ShopperIdentity,
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B>>,
    gateway: web::Data<RazorpayApi>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase + ProductCatalog,
{
    let ShopperIdentity(shopper) = shopper;
    let req = body.into_inner();
    let new_order = NewOrder {
        customer_id: shopper.customer_key().to_string(),
        customer_name: req.customer_name,
        email: req.email,
        address: req.address,
        payment_method: req.payment_method,
    };
    let (mut order, items) = api.place_order(&shopper, new_order).await?;
    let gateway_order_id = match order.payment_method {
        PaymentMethod::Online => {
            let receipt = Uuid::new_v4().to_string();
            let remote_id = gateway.create_order(order.total_amount, &receipt).await?;
            order = api.attach_gateway_order(order.id, &remote_id).await?;
            Some(remote_id)
        },
        PaymentMethod::Cod => None,
    };
    debug!("💻️ Checkout complete for order #{}", order.id);
    Ok(HttpResponse::Ok().json(CheckoutResponse { order, items, gateway_order_id }))
}

route!(verify_payment => Post "/checkout/verify" impl CheckoutDatabase, ProductCatalog);
/// The client's post-payment verify call.
///
/// The signature covers `"{gateway_order_id}|{gateway_payment_id}"` under the API key secret. A valid signature
/// records the payment id on the order and nothing more; the webhook channel remains the only authority that can
/// move order state.
pub async fn verify_payment<B>(
    body: web::Json<VerifyPaymentRequest>,
    api: web::Data<CheckoutApi<B>>,
    gateway: web::Data<RazorpayApi>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase + ProductCatalog,
{
    let req = body.into_inner();
    let key_secret = gateway.config().key_secret.reveal();
    if !verify_payment_signature(&req.gateway_order_id, &req.gateway_payment_id, &req.signature, key_secret) {
        warn!("💻️ Payment verify call with bad signature for gateway order [{}]", req.gateway_order_id);
        return Err(ServerError::InvalidPaymentSignature);
    }
    let order = api.record_verified_payment(&req.gateway_order_id, &req.gateway_payment_id).await?;
    debug!("💻️ Payment [{}] verified (tentatively) for order #{}", req.gateway_payment_id, order.id);
    Ok(HttpResponse::Ok().json(VerifyPaymentResponse { success: true, redirect: Some(format!("/orders/{}", order.id)) }))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_orders => Get "/orders" impl CheckoutDatabase, ProductCatalog);
pub async fn my_orders<B>(shopper: ShopperIdentity, api: web::Data<CheckoutApi<B>>) -> Result<HttpResponse, ServerError>
where B: CheckoutDatabase + ProductCatalog {
    let orders = api.orders_for_customer(shopper.0.customer_key()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl CheckoutDatabase, ProductCatalog);
/// An order is only visible to the shopper who placed it. Anything else is a 404, not a 403, so order ids cannot
/// be probed.
pub async fn order_by_id<B>(
    shopper: ShopperIdentity,
    path: web::Path<i64>,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase + ProductCatalog,
{
    let id = path.into_inner();
    let not_found = || ServerError::NoRecordFound(format!("Order {id}"));
    let order = api.order(id).await?.ok_or_else(not_found)?;
    if order.customer_id != shopper.0.customer_key() {
        return Err(not_found());
    }
    let items = api.order_items(id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "order": order, "items": items })))
}
