use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use jardim_engine::{
    db_types::{BonusType, NewNotification, WithdrawalStatus},
    events::{
        BonusGrantedEvent,
        DelinquencyChangedEvent,
        EventHandlers,
        EventHooks,
        EventProducers,
        OrderDeliveredEvent,
        WithdrawalDecidedEvent,
    },
    AccountApi,
    AuthApi,
    CatalogApi,
    NotificationsApi,
    OrderFlowApi,
    ReportsApi,
    RewardsApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    middleware::{HmacMiddlewareFactory, JwtMiddlewareFactory},
    overdue_worker::start_overdue_worker,
    routes::*,
};

const EVENT_BUFFER_SIZE: usize = 128;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not migrate database. {e}")))?;
    if let Some(admin) = &config.admin {
        let user = AuthApi::new(db.clone())
            .ensure_admin(admin.registration())
            .await
            .map_err(|e| ServerError::InitializeError(format!("Could not create the admin account. {e}")))?;
        info!("🚀️ Admin account is #{} ({})", user.id, user.email);
    }
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, notification_hooks(db.clone()));
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let _worker = start_overdue_worker(db.clone(), producers.clone(), config.overdue_sweep_interval);
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(ServerError::IOError)
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let token_issuer = TokenIssuer::new(&config.auth)?;
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone()).with_min_order_value(config.min_order_value);
        let auth_api = AuthApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let rewards_api = RewardsApi::new(db.clone(), producers.clone());
        let notifications_api = NotificationsApi::new(db.clone());
        let reports_api = ReportsApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("jp::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(rewards_api))
            .app_data(web::Data::new(notifications_api))
            .app_data(web::Data::new(reports_api))
            .app_data(web::Data::new(token_issuer.clone()))
            .app_data(web::Data::new(config.proxy_config()));
        // Routes that require authentication
        let api_scope = web::scope("/api")
            .wrap(JwtMiddlewareFactory::new(token_issuer.clone()))
            .service(MyAccountRoute::<SqliteDatabase>::new())
            .service(UpdateMyAccountRoute::<SqliteDatabase>::new())
            .service(UsersRoute::<SqliteDatabase>::new())
            .service(UserByIdRoute::<SqliteDatabase>::new())
            .service(UpdateUserStatusRoute::<SqliteDatabase>::new())
            .service(CheckUserRoute::<SqliteDatabase>::new())
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductByIdRoute::<SqliteDatabase>::new())
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new())
            .service(AddVariationRoute::<SqliteDatabase>::new())
            .service(SetStockRoute::<SqliteDatabase>::new())
            .service(PlaceOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(OrderPaymentsRoute::<SqliteDatabase>::new())
            .service(SearchOrdersRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(SettlePaymentRoute::<SqliteDatabase>::new())
            .service(MarkPaymentOverdueRoute::<SqliteDatabase>::new())
            .service(MyCommissionsRoute::<SqliteDatabase>::new())
            .service(AllCommissionsRoute::<SqliteDatabase>::new())
            .service(MyBonusesRoute::<SqliteDatabase>::new())
            .service(AllBonusesRoute::<SqliteDatabase>::new())
            .service(RequestWithdrawalRoute::<SqliteDatabase>::new())
            .service(MyWithdrawalsRoute::<SqliteDatabase>::new())
            .service(AllWithdrawalsRoute::<SqliteDatabase>::new())
            .service(ApproveWithdrawalRoute::<SqliteDatabase>::new())
            .service(RejectWithdrawalRoute::<SqliteDatabase>::new())
            .service(RequestHotelBookingRoute::<SqliteDatabase>::new())
            .service(MyHotelBookingsRoute::<SqliteDatabase>::new())
            .service(AllHotelBookingsRoute::<SqliteDatabase>::new())
            .service(ConfirmHotelBookingRoute::<SqliteDatabase>::new())
            .service(CancelHotelBookingRoute::<SqliteDatabase>::new())
            .service(MyNotificationsRoute::<SqliteDatabase>::new())
            .service(MarkNotificationReadRoute::<SqliteDatabase>::new())
            .service(MyDashboardRoute::<SqliteDatabase>::new())
            .service(AdminDashboardRoute::<SqliteDatabase>::new())
            .service(ExportCsvRoute::<SqliteDatabase>::new());
        let webhook_scope = web::scope("/webhook")
            .wrap(HmacMiddlewareFactory::new(
                &config.webhook.hmac_header,
                config.webhook.hmac_secret.clone(),
                config.webhook.hmac_checks,
            ))
            .service(PaymentWebhookRoute::<SqliteDatabase>::new());
        app.service(health)
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(webhook_scope)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}

/// Hooks that turn engine events into in-app notifications for the seller concerned.
pub fn notification_hooks(db: SqliteDatabase) -> EventHooks {
    let mut hooks = EventHooks::default();
    let bonus_db = db.clone();
    let delinquency_db = db.clone();
    let withdrawal_db = db.clone();
    hooks
        .on_bonus_granted(move |ev| {
            let db = bonus_db.clone();
            Box::pin(async move { notify(db, bonus_notification(&ev)).await })
        })
        .on_delinquency_changed(move |ev| {
            let db = delinquency_db.clone();
            Box::pin(async move { notify(db, delinquency_notification(&ev)).await })
        })
        .on_withdrawal_decided(move |ev| {
            let db = withdrawal_db.clone();
            Box::pin(async move {
                if let Some(n) = withdrawal_notification(&ev) {
                    notify(db, n).await
                }
            })
        })
        .on_order_delivered(move |ev| {
            let db = db.clone();
            Box::pin(async move { notify(db, delivery_notification(&ev)).await })
        });
    hooks
}

async fn notify(db: SqliteDatabase, notification: NewNotification) {
    let user_id = notification.user_id;
    let api = NotificationsApi::new(db);
    if let Err(e) = api.notify(notification).await {
        warn!("🔔️ Could not notify user #{user_id}. {e}");
    }
}

fn bonus_notification(ev: &BonusGrantedEvent) -> NewNotification {
    let bonus = &ev.bonus;
    match bonus.bonus_type {
        BonusType::HotelMajestic => NewNotification::new(
            bonus.user_id,
            "Prêmio Hotel Majestic",
            format!(
                "Parabéns! Com {} vendas qualificadas você ganhou uma estadia no Hotel Majestic.",
                ev.qualifying_sales
            ),
        ),
        BonusType::Meta(target) => NewNotification::new(
            bonus.user_id,
            "Bônus liberado",
            format!("Você atingiu a meta de {target} vendas e ganhou um bônus de {}.", bonus.value),
        ),
    }
}

fn delinquency_notification(ev: &DelinquencyChangedEvent) -> NewNotification {
    if ev.is_blocked {
        NewNotification::new(
            ev.user_id,
            "Conta bloqueada",
            format!(
                "Sua conta foi bloqueada porque você tem {} pagamentos em atraso. Regularize-os para voltar a vender.",
                ev.overdue_payments
            ),
        )
    } else {
        NewNotification::new(ev.user_id, "Conta desbloqueada", "Seus pagamentos estão em dia. Boas vendas!")
    }
}

fn withdrawal_notification(ev: &WithdrawalDecidedEvent) -> Option<NewNotification> {
    let w = &ev.withdrawal;
    let note = w.admin_note.as_ref().map(|n| format!(" Observação: {n}")).unwrap_or_default();
    match w.status {
        WithdrawalStatus::Aprovado => Some(NewNotification::new(
            w.user_id,
            "Saque aprovado",
            format!("Seu saque de {} foi aprovado e será enviado para a chave PIX {}.{note}", w.amount, w.pix_key),
        )),
        WithdrawalStatus::Recusado => Some(NewNotification::new(
            w.user_id,
            "Saque recusado",
            format!("Seu saque de {} foi recusado.{note}", w.amount),
        )),
        WithdrawalStatus::Pendente => None,
    }
}

fn delivery_notification(ev: &OrderDeliveredEvent) -> NewNotification {
    NewNotification::new(ev.order.user_id, "Pedido entregue", format!("O pedido #{} foi entregue.", ev.order.id))
}
