//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (e.g. I/O, database operations,
//! etc.) should be expressed as futures or asynchronous functions.
//!
//! Uploading an order can take a while when the reconciliation queue is full. The handler waits for a free slot
//! without blocking the worker thread.
use actix_web::{
    cookie::Cookie,
    get,
    http::header,
    web,
    HttpMessage,
    HttpRequest,
    HttpResponse,
    Responder,
};
use bonus_market_engine::{
    db_types::{NewUser, UserAccount},
    traits::{AccountManagement, OrderLedger, UserManagement, WalletLedger},
    AccountApi,
    AuthApi,
    OrderFlowApi,
    SubmitOrderResult,
    WalletApi,
};
use log::*;

use crate::{
    auth::{JwtClaims, TokenIssuer, AUTH_COOKIE},
    data_objects::{
        BalanceResponse,
        Credentials,
        JsonResponse,
        OrderResponse,
        WithdrawRequest,
        WithdrawalResponse,
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

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires auth)  => {
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
                    .to($name::<A>)
                    .wrap($crate::middleware::JwtAuthMiddlewareFactory::new());
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
route!(register => Post "/register" impl UserManagement);
/// Creates a new user and logs them in.
///
/// Expects a JSON body `{"login": "...", "password": "..."}`. On success, the access token is returned in the
/// `auth_token` cookie and the `Authorization` header.
pub async fn register<A>(
    body: web::Json<Credentials>,
    api: web::Data<AuthApi<A>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError>
where
    A: UserManagement,
{
    trace!("💻️ Received registration request for {}", body.login);
    let Credentials { login, password } = body.into_inner();
    let user = api.register(NewUser::new(login, password)).await?;
    logged_in_response(&user, &signer, "Registration successful")
}

route!(login => Post "/login" impl UserManagement);
/// Checks a login and password, and issues an access token.
pub async fn login<A>(
    body: web::Json<Credentials>,
    api: web::Data<AuthApi<A>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError>
where
    A: UserManagement,
{
    trace!("💻️ Received login request for {}", body.login);
    let Credentials { login, password } = body.into_inner();
    let user = api.login(NewUser::new(login, password)).await?;
    logged_in_response(&user, &signer, "Login successful")
}

fn logged_in_response(user: &UserAccount, signer: &TokenIssuer, message: &str) -> Result<HttpResponse, ServerError> {
    let token = signer.issue_token(user)?;
    let cookie = Cookie::build(AUTH_COOKIE, token.clone()).path("/").http_only(true).finish();
    trace!("💻️ Issued access token for user #{}", user.id);
    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .json(JsonResponse::success(message)))
}

//----------------------------------------------   Orders  ----------------------------------------------------
const TEXT_PLAIN: &str = "text/plain";

route!(submit_order => Post "/orders" impl OrderLedger where requires auth);
/// Uploads an order number for the authenticated user.
///
/// The body is the order number as `text/plain`.
/// * 202 Accepted: the order is new and will be reconciled.
/// * 200 OK: the user has uploaded this order before.
/// * 409 Conflict: another user has uploaded this order.
/// * 422 Unprocessable Entity: the number fails the Luhn check.
pub async fn submit_order<B>(
    req: HttpRequest,
    claims: JwtClaims,
    body: String,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderLedger,
{
    if !req.content_type().eq_ignore_ascii_case(TEXT_PLAIN) {
        debug!("💻️ Order upload with content type '{}' rejected", req.content_type());
        return Err(ServerError::UnsupportedContentType(TEXT_PLAIN.to_string()));
    }
    trace!("💻️ User #{} is uploading order [{}]", claims.sub, body.trim());
    match api.submit_order(&body, claims.user_id()).await? {
        SubmitOrderResult::Accepted(order) => {
            Ok(HttpResponse::Accepted().json(JsonResponse::success(format!("Order {} accepted", order.number))))
        },
        SubmitOrderResult::AlreadyExists => {
            Ok(HttpResponse::Ok().json(JsonResponse::success("Order has already been uploaded")))
        },
    }
}

route!(my_orders => Get "/orders" impl AccountManagement where requires auth);
/// Lists the authenticated user's orders, newest first. Responds with 204 No Content if there are none.
pub async fn my_orders<B>(claims: JwtClaims, api: web::Data<AccountApi<B>>) -> Result<HttpResponse, ServerError>
where B: AccountManagement {
    debug!("💻️ GET orders for user #{}", claims.sub);
    let orders = api.orders_for_user(claims.user_id()).await?;
    if orders.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let orders = orders.into_iter().map(OrderResponse::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Balance  ----------------------------------------------------
route!(balance => Get "/balance" impl AccountManagement where requires auth);
pub async fn balance<B>(claims: JwtClaims, api: web::Data<AccountApi<B>>) -> Result<HttpResponse, ServerError>
where B: AccountManagement {
    debug!("💻️ GET balance for user #{}", claims.sub);
    let wallet = api.wallet_for_user(claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(BalanceResponse::from(wallet)))
}

route!(withdraw => Post "/balance/withdraw" impl WalletLedger where requires auth);
/// Spends bonuses against a new order.
///
/// * 200 OK: the withdrawal was recorded.
/// * 402 Payment Required: not enough bonuses.
/// * 422 Unprocessable Entity: the order number fails the Luhn check, or the sum is not positive.
pub async fn withdraw<B>(
    claims: JwtClaims,
    body: web::Json<WithdrawRequest>,
    api: web::Data<WalletApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: WalletLedger,
{
    let WithdrawRequest { order, sum } = body.into_inner();
    debug!("💻️ User #{} is withdrawing {sum} against order [{order}]", claims.sub);
    let withdrawal = api.withdraw(claims.user_id(), &order, sum).await?;
    Ok(HttpResponse::Ok().json(WithdrawalResponse::from(withdrawal)))
}

route!(withdrawals => Get "/withdrawals" impl AccountManagement where requires auth);
/// Lists the authenticated user's withdrawals, newest first. Responds with 204 No Content if there are none.
pub async fn withdrawals<B>(claims: JwtClaims, api: web::Data<AccountApi<B>>) -> Result<HttpResponse, ServerError>
where B: AccountManagement {
    debug!("💻️ GET withdrawals for user #{}", claims.sub);
    let withdrawals = api.withdrawals_for_user(claims.user_id()).await?;
    if withdrawals.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let withdrawals = withdrawals.into_iter().map(WithdrawalResponse::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(withdrawals))
}
