use cucumber::{given, when};
use jardim_engine::{
    db_types::{ProductUpdate, UserStatus},
    UserManagement,
};

use crate::cucumber::{world::BackOffice, JardimWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut JardimWorld) {
    world.system = Some(BackOffice::new().await);
}

#[given(expr = "a seller {string}")]
async fn a_seller(world: &mut JardimWorld, name: String) {
    world.system_mut().register_seller(&name, None).await;
}

#[given(expr = "a seller {string} with PIX key {string}")]
async fn a_seller_with_pix(world: &mut JardimWorld, name: String, pix_key: String) {
    world.system_mut().register_seller(&name, Some(pix_key)).await;
}

#[given(expr = "a product {string} priced at R${int} with {int} in stock")]
async fn a_product(world: &mut JardimWorld, name: String, price: i64, stock: i64) {
    world.system_mut().ensure_product(&name, price, stock).await;
}

#[when(expr = "product {string} is deactivated")]
async fn deactivate_product(world: &mut JardimWorld, name: String) {
    let sys = world.system_mut();
    let product_id = *sys.products.get(&name).unwrap_or_else(|| panic!("Unknown product {name}"));
    let update = ProductUpdate { active: Some(false), ..Default::default() };
    let result = sys.catalog.update_product(product_id, update).await;
    sys.record(result);
}

#[when(expr = "an admin deactivates {string}")]
async fn deactivate_seller(world: &mut JardimWorld, name: String) {
    let sys = world.system_mut();
    let result = sys.db.set_user_status(sys.seller_id(&name), UserStatus::Inativa, false).await;
    sys.record(result);
}
