use std::collections::HashMap;

use cucumber::World;
use jardim_engine::{
    db_types::{NewProduct, NewVariation, User},
    events::EventProducers,
    jp_api::account_objects::Registration,
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    AuthApi,
    CatalogApi,
    OrderFlowApi,
    ReportsApi,
    RewardsApi,
    SqliteDatabase,
    UserManagement,
};
use log::*;

#[derive(Default, Debug, World)]
pub struct JardimWorld {
    pub system: Option<BackOffice>,
}

impl JardimWorld {
    pub fn system(&self) -> &BackOffice {
        self.system.as_ref().expect("The back office has not been initialised")
    }

    pub fn system_mut(&mut self) -> &mut BackOffice {
        self.system.as_mut().expect("The back office has not been initialised")
    }
}

/// Everything a scenario needs, wired to a fresh database
#[derive(Debug)]
pub struct BackOffice {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub auth: AuthApi<SqliteDatabase>,
    pub catalog: CatalogApi<SqliteDatabase>,
    pub flow: OrderFlowApi<SqliteDatabase>,
    pub rewards: RewardsApi<SqliteDatabase>,
    pub reports: ReportsApi<SqliteDatabase>,
    pub sellers: HashMap<String, i64>,
    pub products: HashMap<String, i64>,
    pub variations: HashMap<String, i64>,
    pub orders: HashMap<String, i64>,
    pub last_error: Option<String>,
    pub last_withdrawal: Option<i64>,
    pub last_booking: Option<i64>,
    next_cpf: u64,
}

impl BackOffice {
    pub async fn new() -> Self {
        let url = random_db_path();
        create_database(&url).await;
        run_migrations(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        Self {
            db_path: url,
            auth: AuthApi::new(db.clone()),
            catalog: CatalogApi::new(db.clone()),
            flow: OrderFlowApi::new(db.clone(), EventProducers::default()),
            rewards: RewardsApi::new(db.clone(), EventProducers::default()),
            reports: ReportsApi::new(db.clone()),
            db,
            sellers: HashMap::new(),
            products: HashMap::new(),
            variations: HashMap::new(),
            orders: HashMap::new(),
            last_error: None,
            last_withdrawal: None,
            last_booking: None,
            next_cpf: 100_000_001,
        }
    }

    pub async fn register_seller(&mut self, name: &str, pix_key: Option<String>) -> User {
        let cpf = cpf_from_base(self.next_cpf);
        self.next_cpf += 7919;
        let registration = Registration {
            name: name.to_string(),
            email: format!("{}@jardimprive.test", name.to_lowercase()),
            cpf,
            phone: None,
            password: "senha-secreta".into(),
            pix_key,
        };
        let user = self.auth.register(registration).await.expect("Error registering seller");
        self.sellers.insert(name.to_string(), user.id);
        user
    }

    pub fn seller_id(&self, name: &str) -> i64 {
        *self.sellers.get(name).unwrap_or_else(|| panic!("Unknown seller {name}"))
    }

    pub async fn seller(&self, name: &str) -> User {
        let id = self.seller_id(name);
        self.db.fetch_user(id).await.expect("Error fetching user").expect("Seller does not exist")
    }

    pub fn order_id(&self, alias: &str) -> i64 {
        *self.orders.get(alias).unwrap_or_else(|| panic!("Unknown order {alias}"))
    }

    pub fn variation_id(&self, product: &str) -> i64 {
        *self.variations.get(product).unwrap_or_else(|| panic!("Unknown product {product}"))
    }

    /// Adds a product with a single variation, or returns the existing one
    pub async fn ensure_product(&mut self, name: &str, price_reais: i64, stock: i64) -> i64 {
        if let Some(id) = self.variations.get(name) {
            return *id;
        }
        let product = NewProduct {
            name: name.to_string(),
            description: None,
            price: jardim_engine::db_types::Centavos::from_reais(price_reais),
            image_url: None,
            variations: vec![NewVariation { name: "Único".into(), sku: None, stock }],
        };
        let product = self.catalog.create_product(product).await.expect("Error creating product");
        let id = product.variations[0].id;
        self.products.insert(name.to_string(), product.product.id);
        self.variations.insert(name.to_string(), id);
        id
    }

    pub fn record<T, E: ToString>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(v) => {
                self.last_error = None;
                Some(v)
            },
            Err(e) => {
                debug!("🚀️ Recorded error: {}", e.to_string());
                self.last_error = Some(e.to_string());
                None
            },
        }
    }
}

/// Appends valid check digits to a 9-digit base number
pub fn cpf_from_base(base: u64) -> String {
    let mut digits = format!("{base:09}").chars().filter_map(|c| c.to_digit(10)).collect::<Vec<u32>>();
    for _ in 0..2 {
        let n = digits.len() as u32 + 1;
        let sum: u32 = digits.iter().enumerate().map(|(i, d)| d * (n - i as u32)).sum();
        let rest = (sum * 10) % 11;
        digits.push(if rest == 10 { 0 } else { rest });
    }
    digits.into_iter().map(|d| char::from_digit(d, 10).unwrap_or('0')).collect()
}
