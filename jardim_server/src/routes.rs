//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate function. Keep this module neat and tidy 🙏
//!
//! Every route below the Auth section is mounted in the `/api` scope, behind the bearer token middleware. Routes
//! declared with `requires [Role::Admin]` are additionally wrapped in the ACL middleware.
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any I/O (the database, mostly) must be awaited, never blocked on.
use actix_web::{get, http::header, web, HttpRequest, HttpResponse, Responder};
use jardim_engine::{
    db_types::{NewHotelBooking, NewOrder, NewProduct, NewVariation, ProductUpdate, Role},
    jp_api::{
        account_objects::{ProfileChanges, Registration, StatusChange},
        payment_objects::GatewayNotification,
        reports_api::ReportKind,
    },
    order_objects::OrderQueryFilter,
    traits::{
        data_objects::{FullOrder, UserQueryFilter},
        CatalogManagement,
        NotificationManagement,
        ReportsManagement,
        RewardsManagement,
        SalesDatabase,
        UserManagement,
    },
    AccountApi,
    AuthApi,
    CatalogApi,
    NotificationsApi,
    OrderFlowApi,
    ReportsApi,
    RewardsApi,
};
use log::*;

use crate::{
    auth::{JwtClaims, TokenIssuer},
    config::ProxyConfig,
    data_objects::{
        AccrualCheckResult,
        BookingRequest,
        CatalogParams,
        DecisionNote,
        JsonResponse,
        LoginRequest,
        LoginResponse,
        NewOrderRequest,
        NotificationParams,
        OrderSearchParams,
        OrderStatusUpdate,
        StockUpdate,
        WithdrawalParams,
        WithdrawalRequestBody,
    },
    errors::ServerError,
    helpers::get_remote_ip,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+ where requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
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

//----------------------------------------------   Auth  ----------------------------------------------------
route!(register => Post "/auth/register" impl UserManagement);
/// Seller sign-up. New accounts are `VENDEDORA`, `ATIVA` and unblocked. Admin accounts cannot be created here.
pub async fn register<B: UserManagement>(
    body: web::Json<Registration>,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let registration = body.into_inner();
    debug!("💻️ POST register for {}", registration.email);
    let user = api.register(registration).await?;
    Ok(HttpResponse::Created().json(user))
}

route!(login => Post "/auth/login" impl UserManagement);
/// Route handler for the login endpoint
///
/// Checks the e-mail and password and issues an access token. The token must be supplied in the
/// `Authorization: Bearer <token>` header on every `/api` call. It is valid for `JP_JWT_EXPIRY_HOURS` and does not
/// refresh.
///
/// Blocked sellers may log in; deactivated accounts may not.
pub async fn login<B: UserManagement>(
    req: HttpRequest,
    body: web::Json<LoginRequest>,
    api: web::Data<AuthApi<B>>,
    signer: web::Data<TokenIssuer>,
    proxy: web::Data<ProxyConfig>,
) -> Result<HttpResponse, ServerError> {
    let LoginRequest { email, password } = body.into_inner();
    let ip = get_remote_ip(&req, proxy.use_x_forwarded_for, proxy.use_forwarded)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown address".into());
    trace!("💻️ Login request for {email} from {ip}");
    let user = api.authenticate(&email, &password).await.map_err(|e| {
        info!("💻️ Failed login for {email} from {ip}. {e}");
        ServerError::from(e)
    })?;
    let token = signer.issue_token(&user)?;
    debug!("💻️ User #{} logged in from {ip}", user.id);
    Ok(HttpResponse::Ok().json(LoginResponse { token, user }))
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(payment_webhook => Post "/payment" impl SalesDatabase);
/// The payment gateway webhook, mounted at `/webhook/payment`.
///
/// The signature has already been checked by the HMAC middleware by the time this handler runs. An `approved`
/// notification settles every outstanding payment of the order named in `external_reference`.
///
/// The gateway retries any call that does not return 200, so this handler always answers 200 OK. Whether the
/// notification had any effect is reported in the [`JsonResponse`] body.
pub async fn payment_webhook<B: SalesDatabase>(
    body: web::Bytes,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received payment webhook call");
    let notification = match serde_json::from_slice::<GatewayNotification>(&body) {
        Ok(n) => n,
        Err(e) => {
            warn!("💻️ Could not read payment webhook body. {e}");
            return Ok(HttpResponse::Ok().json(JsonResponse::failure(format!("Invalid notification. {e}"))));
        },
    };
    let gateway_id = notification.gateway_id().to_string();
    let result = match api.process_gateway_notification(notification).await {
        Ok(Some(settlement)) => {
            info!("💻️ Gateway payment [{gateway_id}] settled order #{}", settlement.order.id);
            JsonResponse::success(format!("Order #{} settled", settlement.order.id))
        },
        Ok(None) => JsonResponse::success("Notification acknowledged. No changes were made."),
        Err(e) => {
            warn!("💻️ Could not process gateway payment [{gateway_id}]. {e}");
            JsonResponse::failure(e)
        },
    };
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Users  ----------------------------------------------------
route!(my_account => Get "/me" impl UserManagement);
pub async fn my_account<B: UserManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_account for #{}", claims.user_id);
    let user = api
        .user_by_id(claims.user_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("User #{} does not exist", claims.user_id)))?;
    Ok(HttpResponse::Ok().json(user))
}

route!(update_my_account => Patch "/me" impl UserManagement);
/// Users may change their name, phone, PIX key and password. E-mail, CPF, role and status are not theirs to change.
pub async fn update_my_account<B: UserManagement>(
    claims: JwtClaims,
    body: web::Json<ProfileChanges>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ PATCH my_account for #{}", claims.user_id);
    let user = api.update_profile(claims.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

route!(users => Get "/users" impl UserManagement where requires [Role::Admin]);
pub async fn users<B: UserManagement>(
    query: web::Query<UserQueryFilter>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET users");
    let users = api.search_users(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(users))
}

route!(user_by_id => Get "/users/{id}" impl UserManagement where requires [Role::Admin]);
pub async fn user_by_id<B: UserManagement>(
    path: web::Path<i64>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = path.into_inner();
    debug!("💻️ GET user #{user_id}");
    let user = api
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("User #{user_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(user))
}

route!(update_user_status => Patch "/users/{id}/status" impl UserManagement where requires [Role::Admin]);
/// Admins activate and deactivate accounts, and can lift or impose the block flag by hand.
pub async fn update_user_status<B: UserManagement>(
    path: web::Path<i64>,
    body: web::Json<StatusChange>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = path.into_inner();
    let change = body.into_inner();
    debug!("💻️ PATCH status of user #{user_id} to {change:?}");
    let user = api.set_user_status(user_id, change).await?;
    Ok(HttpResponse::Ok().json(user))
}

route!(check_user => Post "/users/{id}/check" impl SalesDatabase where requires [Role::Admin]);
/// Re-runs the bonus check and the delinquency check for a user. Both are idempotent.
pub async fn check_user<B: SalesDatabase>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = path.into_inner();
    debug!("💻️ POST accrual checks for user #{user_id}");
    let bonus = api.check_bonus(user_id).await?;
    let delinquency = api.check_delinquency(user_id).await?;
    Ok(HttpResponse::Ok().json(AccrualCheckResult { bonus, delinquency }))
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(products => Get "/products" impl CatalogManagement);
pub async fn products<B: CatalogManagement>(
    claims: JwtClaims,
    query: web::Query<CatalogParams>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let include_inactive = query.include_inactive && claims.is_admin();
    debug!("💻️ GET products (include inactive: {include_inactive})");
    let products = api.products(include_inactive).await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product_by_id => Get "/products/{id}" impl CatalogManagement);
/// Deactivated products are only visible to admins.
pub async fn product_by_id<B: CatalogManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    debug!("💻️ GET product #{product_id}");
    let product = api
        .product(product_id)
        .await?
        .filter(|p| p.product.active || claims.is_admin())
        .ok_or_else(|| ServerError::NoRecordFound(format!("Product #{product_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(product))
}

route!(create_product => Post "/products" impl CatalogManagement where requires [Role::Admin]);
pub async fn create_product<B: CatalogManagement>(
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST new product {}", body.name);
    let product = api.create_product(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(update_product => Patch "/products/{id}" impl CatalogManagement where requires [Role::Admin]);
pub async fn update_product<B: CatalogManagement>(
    path: web::Path<i64>,
    body: web::Json<ProductUpdate>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    debug!("💻️ PATCH product #{product_id}");
    let product = api.update_product(product_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(add_variation => Post "/products/{id}/variations" impl CatalogManagement where requires [Role::Admin]);
pub async fn add_variation<B: CatalogManagement>(
    path: web::Path<i64>,
    body: web::Json<NewVariation>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    debug!("💻️ POST variation {} for product #{product_id}", body.name);
    let variation = api.add_variation(product_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(variation))
}

route!(set_stock => Patch "/variations/{id}/stock" impl CatalogManagement where requires [Role::Admin]);
pub async fn set_stock<B: CatalogManagement>(
    path: web::Path<i64>,
    body: web::Json<StockUpdate>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let variation_id = path.into_inner();
    debug!("💻️ PATCH stock of variation #{variation_id} to {}", body.stock);
    let variation = api.set_stock(variation_id, body.stock).await?;
    Ok(HttpResponse::Ok().json(variation))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(place_order => Post "/orders" impl SalesDatabase);
/// Places an order for the logged-in user. Blocked or inactive users are refused with 403.
pub async fn place_order<B: SalesDatabase>(
    claims: JwtClaims,
    body: web::Json<NewOrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let NewOrderRequest { items, payment_plan, shipping_address, notes } = body.into_inner();
    debug!("💻️ POST new {payment_plan} order with {} items for #{}", items.len(), claims.user_id);
    let order = NewOrder { user_id: claims.user_id, items, payment_plan, shipping_address, notes };
    let order = api.place_order(order).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(my_orders => Get "/orders" impl SalesDatabase);
pub async fn my_orders<B: SalesDatabase>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for #{}", claims.user_id);
    let orders = api.search_orders(OrderQueryFilter::default().with_user_id(claims.user_id)).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl SalesDatabase);
/// Sellers can fetch their own orders. Admins can fetch any order. Orders belonging to someone else are reported as
/// not found, whether they exist or not.
pub async fn order_by_id<B: SalesDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order #{order_id} for #{}", claims.user_id);
    let order = fetch_visible_order(&claims, order_id, &api).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(order_payments => Get "/orders/{id}/payments" impl SalesDatabase);
pub async fn order_payments<B: SalesDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET payments for order #{order_id}");
    let order = fetch_visible_order(&claims, order_id, &api).await?;
    Ok(HttpResponse::Ok().json(order.payments))
}

async fn fetch_visible_order<B: SalesDatabase>(
    claims: &JwtClaims,
    order_id: i64,
    api: &OrderFlowApi<B>,
) -> Result<FullOrder, ServerError> {
    api.full_order(order_id)
        .await?
        .filter(|o| claims.can_access(o.order.user_id))
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order #{order_id} does not exist")))
}

route!(search_orders => Get "/admin/orders" impl SalesDatabase where requires [Role::Admin]);
pub async fn search_orders<B: SalesDatabase>(
    query: web::Query<OrderSearchParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let query = OrderQueryFilter::try_from(query.into_inner())?;
    debug!("💻️ GET orders search for [{query}]");
    let orders = api.search_orders(query).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(update_order_status => Patch "/orders/{id}/status" impl SalesDatabase where requires [Role::Admin]);
/// Moves an order forward. Delivering it runs the bonus check for the seller; cancelling it returns the stock.
pub async fn update_order_status<B: SalesDatabase>(
    path: web::Path<i64>,
    body: web::Json<OrderStatusUpdate>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ PATCH order #{order_id} status to {}", body.status);
    let change = api.modify_status_for_order(order_id, body.status).await?;
    Ok(HttpResponse::Ok().json(change))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(settle_payment => Post "/payments/{id}/settle" impl SalesDatabase where requires [Role::Admin]);
/// Manual settlement, for payments received outside the gateway.
pub async fn settle_payment<B: SalesDatabase>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let payment_id = path.into_inner();
    debug!("💻️ POST settle payment #{payment_id}");
    let result = api.settle_payment(payment_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

route!(mark_payment_overdue => Post "/payments/{id}/overdue" impl SalesDatabase where requires [Role::Admin]);
pub async fn mark_payment_overdue<B: SalesDatabase>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let payment_id = path.into_inner();
    debug!("💻️ POST payment #{payment_id} overdue");
    let result = api.mark_payment_overdue(payment_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Rewards  ----------------------------------------------------
route!(my_commissions => Get "/commissions" impl RewardsManagement, UserManagement);
pub async fn my_commissions<B: RewardsManagement + UserManagement>(
    claims: JwtClaims,
    api: web::Data<RewardsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_commissions for #{}", claims.user_id);
    let commissions = api.commissions(Some(claims.user_id)).await?;
    Ok(HttpResponse::Ok().json(commissions))
}

route!(all_commissions => Get "/admin/commissions" impl RewardsManagement, UserManagement where requires [Role::Admin]);
pub async fn all_commissions<B: RewardsManagement + UserManagement>(
    api: web::Data<RewardsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all commissions");
    let commissions = api.commissions(None).await?;
    Ok(HttpResponse::Ok().json(commissions))
}

route!(my_bonuses => Get "/bonuses" impl RewardsManagement, UserManagement);
pub async fn my_bonuses<B: RewardsManagement + UserManagement>(
    claims: JwtClaims,
    api: web::Data<RewardsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_bonuses for #{}", claims.user_id);
    let bonuses = api.bonuses(Some(claims.user_id)).await?;
    Ok(HttpResponse::Ok().json(bonuses))
}

route!(all_bonuses => Get "/admin/bonuses" impl RewardsManagement, UserManagement where requires [Role::Admin]);
pub async fn all_bonuses<B: RewardsManagement + UserManagement>(
    api: web::Data<RewardsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all bonuses");
    let bonuses = api.bonuses(None).await?;
    Ok(HttpResponse::Ok().json(bonuses))
}

route!(request_withdrawal => Post "/withdrawals" impl RewardsManagement, UserManagement);
/// Requests a PIX payout of part or all of the available balance. Blocked sellers are refused with 403.
pub async fn request_withdrawal<B: RewardsManagement + UserManagement>(
    claims: JwtClaims,
    body: web::Json<WithdrawalRequestBody>,
    api: web::Data<RewardsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let WithdrawalRequestBody { amount, pix_key } = body.into_inner();
    debug!("💻️ POST withdrawal of {amount} for #{}", claims.user_id);
    let withdrawal = api.request_withdrawal(claims.user_id, amount, pix_key).await?;
    Ok(HttpResponse::Created().json(withdrawal))
}

route!(my_withdrawals => Get "/withdrawals" impl RewardsManagement, UserManagement);
pub async fn my_withdrawals<B: RewardsManagement + UserManagement>(
    claims: JwtClaims,
    api: web::Data<RewardsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_withdrawals for #{}", claims.user_id);
    let withdrawals = api.withdrawals(Some(claims.user_id), None).await?;
    Ok(HttpResponse::Ok().json(withdrawals))
}

route!(all_withdrawals => Get "/admin/withdrawals" impl RewardsManagement, UserManagement where requires [Role::Admin]);
pub async fn all_withdrawals<B: RewardsManagement + UserManagement>(
    query: web::Query<WithdrawalParams>,
    api: web::Data<RewardsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all withdrawals ({:?})", query.status);
    let withdrawals = api.withdrawals(None, query.status).await?;
    Ok(HttpResponse::Ok().json(withdrawals))
}

route!(approve_withdrawal => Post "/withdrawals/{id}/approve" impl RewardsManagement, UserManagement where requires [Role::Admin]);
/// Approving a withdrawal marks enough of the seller's oldest withdrawable commissions and bonuses as paid to cover
/// its amount. The body is optional.
pub async fn approve_withdrawal<B: RewardsManagement + UserManagement>(
    path: web::Path<i64>,
    body: Option<web::Json<DecisionNote>>,
    api: web::Data<RewardsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let withdrawal_id = path.into_inner();
    debug!("💻️ POST approve withdrawal #{withdrawal_id}");
    let note = body.and_then(|b| b.into_inner().note);
    let decision = api.approve_withdrawal(withdrawal_id, note).await?;
    Ok(HttpResponse::Ok().json(decision))
}

route!(reject_withdrawal => Post "/withdrawals/{id}/reject" impl RewardsManagement, UserManagement where requires [Role::Admin]);
pub async fn reject_withdrawal<B: RewardsManagement + UserManagement>(
    path: web::Path<i64>,
    body: Option<web::Json<DecisionNote>>,
    api: web::Data<RewardsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let withdrawal_id = path.into_inner();
    debug!("💻️ POST reject withdrawal #{withdrawal_id}");
    let note = body.and_then(|b| b.into_inner().note);
    let withdrawal = api.reject_withdrawal(withdrawal_id, note).await?;
    Ok(HttpResponse::Ok().json(withdrawal))
}

//----------------------------------------------   Hotel  ----------------------------------------------------
route!(request_hotel_booking => Post "/hotel-bookings" impl RewardsManagement, UserManagement);
pub async fn request_hotel_booking<B: RewardsManagement + UserManagement>(
    claims: JwtClaims,
    body: web::Json<BookingRequest>,
    api: web::Data<RewardsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let BookingRequest { check_in, check_out, guests } = body.into_inner();
    debug!("💻️ POST hotel booking {check_in} to {check_out} for #{}", claims.user_id);
    let booking = NewHotelBooking { user_id: claims.user_id, check_in, check_out, guests };
    let booking = api.request_hotel_booking(booking).await?;
    Ok(HttpResponse::Created().json(booking))
}

route!(my_hotel_bookings => Get "/hotel-bookings" impl RewardsManagement, UserManagement);
pub async fn my_hotel_bookings<B: RewardsManagement + UserManagement>(
    claims: JwtClaims,
    api: web::Data<RewardsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_hotel_bookings for #{}", claims.user_id);
    let bookings = api.hotel_bookings(Some(claims.user_id)).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

route!(all_hotel_bookings => Get "/admin/hotel-bookings" impl RewardsManagement, UserManagement where requires [Role::Admin]);
pub async fn all_hotel_bookings<B: RewardsManagement + UserManagement>(
    api: web::Data<RewardsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all hotel bookings");
    let bookings = api.hotel_bookings(None).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

route!(confirm_hotel_booking => Post "/hotel-bookings/{id}/confirm" impl RewardsManagement, UserManagement where requires [Role::Admin]);
pub async fn confirm_hotel_booking<B: RewardsManagement + UserManagement>(
    path: web::Path<i64>,
    body: Option<web::Json<DecisionNote>>,
    api: web::Data<RewardsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let booking_id = path.into_inner();
    debug!("💻️ POST confirm hotel booking #{booking_id}");
    let note = body.and_then(|b| b.into_inner().note);
    let booking = api.confirm_hotel_booking(booking_id, note).await?;
    Ok(HttpResponse::Ok().json(booking))
}

route!(cancel_hotel_booking => Post "/hotel-bookings/{id}/cancel" impl RewardsManagement, UserManagement where requires [Role::Admin]);
pub async fn cancel_hotel_booking<B: RewardsManagement + UserManagement>(
    path: web::Path<i64>,
    body: Option<web::Json<DecisionNote>>,
    api: web::Data<RewardsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let booking_id = path.into_inner();
    debug!("💻️ POST cancel hotel booking #{booking_id}");
    let note = body.and_then(|b| b.into_inner().note);
    let booking = api.cancel_hotel_booking(booking_id, note).await?;
    Ok(HttpResponse::Ok().json(booking))
}

//----------------------------------------------   Notifications  ----------------------------------------------------
route!(my_notifications => Get "/notifications" impl NotificationManagement);
pub async fn my_notifications<B: NotificationManagement>(
    claims: JwtClaims,
    query: web::Query<NotificationParams>,
    api: web::Data<NotificationsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_notifications for #{}", claims.user_id);
    let notifications = api.notifications(claims.user_id, query.unread_only).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

route!(mark_notification_read => Post "/notifications/{id}/read" impl NotificationManagement);
pub async fn mark_notification_read<B: NotificationManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<NotificationsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let notification_id = path.into_inner();
    trace!("💻️ POST notification #{notification_id} read");
    let notification = api.mark_read(claims.user_id, notification_id).await?;
    Ok(HttpResponse::Ok().json(notification))
}

//----------------------------------------------   Reports  ----------------------------------------------------
route!(my_dashboard => Get "/dashboard" impl ReportsManagement);
pub async fn my_dashboard<B: ReportsManagement>(
    claims: JwtClaims,
    api: web::Data<ReportsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET dashboard for #{}", claims.user_id);
    let dashboard = api.seller_dashboard(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}

route!(admin_dashboard => Get "/admin/dashboard" impl ReportsManagement where requires [Role::Admin]);
pub async fn admin_dashboard<B: ReportsManagement>(api: web::Data<ReportsApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET admin dashboard");
    let dashboard = api.admin_dashboard().await?;
    Ok(HttpResponse::Ok().json(dashboard))
}

route!(export_csv => Get "/admin/export/{report}" impl ReportsManagement where requires [Role::Admin]);
/// CSV exports: `orders.csv`, `commissions.csv`, `bonuses.csv` and `withdrawals.csv`.
pub async fn export_csv<B: ReportsManagement>(
    path: web::Path<String>,
    api: web::Data<ReportsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let report = path.into_inner();
    debug!("💻️ GET export {report}");
    let kind = report.parse::<ReportKind>().map_err(|e| ServerError::NoRecordFound(e.to_string()))?;
    let csv = api.export_csv(kind).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", kind.file_name())))
        .body(csv))
}
