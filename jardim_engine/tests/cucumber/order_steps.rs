use chrono::{Months, Utc};
use cucumber::{given, then, when};
use jardim_engine::{
    db_types::{Centavos, NewOrder, OrderStatus, PaymentPlan, PaymentStatus},
    jp_api::payment_objects::GatewayNotification,
    CatalogManagement,
    RewardsManagement,
    SalesDatabase,
};

use crate::cucumber::JardimWorld;

fn parse_money(s: &str) -> Centavos {
    s.parse().unwrap_or_else(|e| panic!("{s} is not a money value: {e}"))
}

#[when(expr = "{string} places order {word} for {int} x {string} paid {word}")]
async fn place_order(world: &mut JardimWorld, seller: String, alias: String, qty: i64, product: String, plan: String) {
    let system = world.system_mut();
    let plan: PaymentPlan = plan.parse().expect("Unknown payment plan");
    let order = NewOrder::new(system.seller_id(&seller), plan).with_item(system.variation_id(&product), qty);
    let result = system.flow.place_order(order).await;
    if let Some(order) = system.record(result) {
        system.orders.insert(alias, order.order.id);
    }
}

#[given(expr = "{string} has completed {int} sales of R${int}")]
async fn completed_sales(world: &mut JardimWorld, seller: String, count: i64, price: i64) {
    complete_sales(world, seller, count, price).await;
}

/// Places, settles and delivers `count` orders of a single item priced at `price` reais.
#[when(expr = "{string} completes {int} sales of R${int}")]
async fn complete_sales(world: &mut JardimWorld, seller: String, count: i64, price: i64) {
    let system = world.system_mut();
    let variation_id = system.ensure_product(&format!("Kit {price}"), price, 10_000).await;
    let user_id = system.seller_id(&seller);
    for _ in 0..count {
        let order = NewOrder::new(user_id, PaymentPlan::AVista).with_item(variation_id, 1);
        let order = system.flow.place_order(order).await.expect("Error placing order");
        let id = order.order.id;
        system.flow.settle_order(id, None).await.expect("Error settling order");
        system.flow.modify_status_for_order(id, OrderStatus::Entregue).await.expect("Error delivering order");
    }
}

#[when(expr = "order {word} moves to {word}")]
async fn move_order(world: &mut JardimWorld, alias: String, status: String) {
    let system = world.system_mut();
    let status: OrderStatus = status.parse().expect("Unknown order status");
    let result = system.flow.modify_status_for_order(system.order_id(&alias), status).await;
    system.record(result);
}

#[when(expr = "payment {int} of order {word} is settled")]
async fn settle_payment(world: &mut JardimWorld, index: usize, alias: String) {
    let system = world.system_mut();
    let payments = system.flow.payments_for_order(system.order_id(&alias)).await.expect("Error fetching payments");
    let payment = payments.get(index - 1).expect("No such payment");
    let result = system.flow.settle_payment(payment.id).await;
    system.record(result);
}

#[when(expr = "payment {int} of order {word} becomes overdue")]
async fn payment_overdue(world: &mut JardimWorld, index: usize, alias: String) {
    let system = world.system_mut();
    let payments = system.flow.payments_for_order(system.order_id(&alias)).await.expect("Error fetching payments");
    let payment = payments.get(index - 1).expect("No such payment");
    let result = system.flow.mark_payment_overdue(payment.id).await;
    system.record(result);
}

#[when(expr = "the gateway reports payment {string} as {string} for order {word}")]
async fn gateway_notification(world: &mut JardimWorld, gateway_id: String, status: String, alias: String) {
    let system = world.system_mut();
    let notification = GatewayNotification::new(gateway_id, status, system.order_id(&alias));
    let result = system.flow.process_gateway_notification(notification).await;
    system.record(result);
}

#[when(expr = "the overdue sweep runs {int} days from now")]
async fn overdue_sweep(world: &mut JardimWorld, days: i64) {
    let system = world.system_mut();
    let as_of = Utc::now() + chrono::Duration::days(days);
    let result = system.flow.sweep_overdue_payments(as_of).await;
    system.record(result);
}

#[when(expr = "the bonus check runs for {string}")]
async fn bonus_check(world: &mut JardimWorld, seller: String) {
    let system = world.system_mut();
    let result = system.flow.check_bonus(system.seller_id(&seller)).await;
    system.record(result);
}

#[when(expr = "the delinquency check runs for {string}")]
async fn delinquency_check(world: &mut JardimWorld, seller: String) {
    let system = world.system_mut();
    let result = system.flow.check_delinquency(system.seller_id(&seller)).await;
    system.record(result);
}

/// Ages the seller's deliveries and bonuses, so that they fall out of (or stay in) the qualifying window.
#[when(expr = "{int} months pass for {string}")]
async fn months_pass(world: &mut JardimWorld, months: u32, seller: String) {
    let system = world.system();
    let user_id = system.seller_id(&seller);
    let then = Utc::now().checked_sub_months(Months::new(months)).expect("Date out of range");
    sqlx::query("UPDATE orders SET delivered_at = $1 WHERE user_id = $2 AND delivered_at IS NOT NULL")
        .bind(then)
        .bind(user_id)
        .execute(system.db.pool())
        .await
        .expect("Error ageing orders");
    sqlx::query("UPDATE bonuses SET created_at = $1 WHERE user_id = $2")
        .bind(then)
        .bind(user_id)
        .execute(system.db.pool())
        .await
        .expect("Error ageing bonuses");
}

#[then(expr = "the last operation fails with {string}")]
async fn last_operation_failed(world: &mut JardimWorld, message: String) {
    let error = world.system().last_error.clone().expect("The last operation succeeded");
    assert!(error.contains(&message), "Expected an error containing '{message}', got '{error}'");
}

#[then("the last operation succeeds")]
async fn last_operation_succeeded(world: &mut JardimWorld) {
    assert_eq!(world.system().last_error, None);
}

#[then(expr = "order {word} has status {word}")]
async fn order_status(world: &mut JardimWorld, alias: String, status: String) {
    let system = world.system();
    let order = system.flow.order(system.order_id(&alias)).await.expect("Error fetching order").expect("No order");
    assert_eq!(order.status.to_string(), status);
}

#[then(expr = "order {word} has payments {string}")]
async fn order_payments(world: &mut JardimWorld, alias: String, expected: String) {
    let system = world.system();
    let payments = system.flow.payments_for_order(system.order_id(&alias)).await.expect("Error fetching payments");
    let actual = payments
        .iter()
        .map(|p| format!("{} {} {}", p.payment_type, p.amount, p.status))
        .collect::<Vec<_>>()
        .join("; ");
    assert_eq!(actual, expected);
}

#[then(expr = "order {word} is fully paid")]
async fn order_fully_paid(world: &mut JardimWorld, alias: String) {
    let system = world.system();
    let payments = system.flow.payments_for_order(system.order_id(&alias)).await.expect("Error fetching payments");
    assert!(payments.iter().all(|p| p.status == PaymentStatus::Pago));
}

#[then(expr = "the commission for order {word} is {string}")]
async fn commission_amount(world: &mut JardimWorld, alias: String, amount: String) {
    let system = world.system();
    let order_id = system.order_id(&alias);
    let commissions = system.db.fetch_commissions(None).await.expect("Error fetching commissions");
    let commission = commissions.iter().find(|c| c.order_id == order_id);
    match amount.as_str() {
        "none" => assert!(commission.is_none(), "Order {alias} has a commission"),
        amount => {
            let commission = commission.unwrap_or_else(|| panic!("Order {alias} has no commission"));
            assert_eq!(commission.amount, parse_money(amount));
        },
    }
}

#[then(expr = "{string} has {int} in stock")]
async fn stock_level(world: &mut JardimWorld, product: String, stock: i64) {
    let system = world.system();
    let variation_id = system.variation_id(&product);
    let products = system.db.fetch_products(true).await.expect("Error fetching products");
    let variation = products
        .iter()
        .flat_map(|p| p.variations.iter())
        .find(|v| v.id == variation_id)
        .expect("Variation does not exist");
    assert_eq!(variation.stock, stock);
}

#[then(expr = "{string} is blocked with status {word}")]
async fn seller_blocked(world: &mut JardimWorld, seller: String, status: String) {
    let user = world.system().seller(&seller).await;
    assert!(user.is_blocked, "{seller} is not blocked");
    assert_eq!(user.status.to_string(), status);
}

#[then(expr = "{string} is not blocked and has status {word}")]
async fn seller_not_blocked(world: &mut JardimWorld, seller: String, status: String) {
    let user = world.system().seller(&seller).await;
    assert!(!user.is_blocked, "{seller} is blocked");
    assert_eq!(user.status.to_string(), status);
}
