use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Duration, NaiveDate, Utc};
pub use jardim_common::Centavos;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

/// Declares a status-like enum that is stored as upper-case text in the database and on the wire.
///
/// The text given for each variant must match the `SCREAMING_SNAKE_CASE` form of the variant name, since that is what
/// sqlx and serde use.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ConversionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ConversionError(format!("{s} is not a valid {}", stringify!($name)))),
                }
            }
        }
    };
}

//--------------------------------------        Role           ---------------------------------------------------------
text_enum!(
    /// Access level of a user
    Role {
        Admin => "ADMIN",
        Vendedora => "VENDEDORA",
    }
);

//--------------------------------------     UserStatus        ---------------------------------------------------------
text_enum!(
    UserStatus {
        /// Normal, active account
        Ativa => "ATIVA",
        /// Set by the delinquency check when too many payments are overdue
        Inadimplente => "INADIMPLENTE",
        /// Disabled by an admin. The user cannot log in.
        Inativa => "INATIVA",
    }
);

//--------------------------------------     OrderStatus       ---------------------------------------------------------
text_enum!(
    OrderStatus {
        Pendente => "PENDENTE",
        Confirmado => "CONFIRMADO",
        EmSeparacao => "EM_SEPARACAO",
        Enviado => "ENVIADO",
        Entregue => "ENTREGUE",
        Cancelado => "CANCELADO",
    }
);

impl OrderStatus {
    /// Whether an order may move from `self` to `next`.
    ///
    /// Orders only move forward along `PENDENTE → CONFIRMADO → EM_SEPARACAO → ENVIADO → ENTREGUE` (steps may be
    /// skipped), and can be cancelled up until they are shipped.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Entregue | Cancelado, _) => false,
            (Pendente | Confirmado | EmSeparacao, Cancelado) => true,
            (Enviado, Cancelado) => false,
            (from, to) => to.rank() > from.rank(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            OrderStatus::Pendente => 0,
            OrderStatus::Confirmado => 1,
            OrderStatus::EmSeparacao => 2,
            OrderStatus::Enviado => 3,
            OrderStatus::Entregue => 4,
            OrderStatus::Cancelado => 5,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, OrderStatus::Entregue | OrderStatus::Cancelado)
    }
}

//--------------------------------------     PaymentPlan       ---------------------------------------------------------
text_enum!(
    PaymentPlan {
        /// One lump-sum payment
        AVista => "A_VISTA",
        /// A deposit (`ENTRADA`) followed by a final installment (`PARCELA_FINAL`)
        Parcelado => "PARCELADO",
    }
);

/// Days until the first (or only) payment of an order is due
pub const FIRST_PAYMENT_DUE_DAYS: i64 = 3;
/// Days until the final installment of a `PARCELADO` order is due
pub const FINAL_INSTALLMENT_DUE_DAYS: i64 = 30;

impl PaymentPlan {
    /// The payments an order placed at `placed_at` must make, as `(type, amount, due date)`.
    ///
    /// Installment plans split the subtotal in two; the deposit takes the odd centavo.
    pub fn schedule(&self, subtotal: Centavos, placed_at: DateTime<Utc>) -> Vec<(PaymentType, Centavos, DateTime<Utc>)> {
        let first_due = placed_at + Duration::days(FIRST_PAYMENT_DUE_DAYS);
        match self {
            PaymentPlan::AVista => vec![(PaymentType::AVista, subtotal, first_due)],
            PaymentPlan::Parcelado => {
                let (entrada, parcela_final) = subtotal.split_in_half();
                let final_due = placed_at + Duration::days(FINAL_INSTALLMENT_DUE_DAYS);
                vec![(PaymentType::Entrada, entrada, first_due), (PaymentType::ParcelaFinal, parcela_final, final_due)]
            },
        }
    }
}

text_enum!(
    PaymentType {
        AVista => "A_VISTA",
        Entrada => "ENTRADA",
        ParcelaFinal => "PARCELA_FINAL",
    }
);

text_enum!(
    PaymentStatus {
        Pendente => "PENDENTE",
        Pago => "PAGO",
        Atrasado => "ATRASADO",
    }
);

text_enum!(
    CommissionStatus {
        Pendente => "PENDENTE",
        Paga => "PAGA",
    }
);

text_enum!(
    BonusStatus {
        Pendente => "PENDENTE",
        Pago => "PAGO",
    }
);

text_enum!(
    WithdrawalStatus {
        Pendente => "PENDENTE",
        Aprovado => "APROVADO",
        Recusado => "RECUSADO",
    }
);

text_enum!(
    BookingStatus {
        Pendente => "PENDENTE",
        Confirmada => "CONFIRMADA",
        Cancelada => "CANCELADA",
    }
);

//--------------------------------------      BonusType        ---------------------------------------------------------
/// The kind of award a bonus represents.
///
/// Tier bonuses are named after the qualifying-sales threshold they were granted for (`META10`, `META20`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BonusType {
    Meta(i64),
    HotelMajestic,
}

pub const META_PREFIX: &str = "META";
pub const HOTEL_MAJESTIC: &str = "HOTEL_MAJESTIC";

impl BonusType {
    pub fn is_tier(&self) -> bool {
        matches!(self, BonusType::Meta(_))
    }
}

impl Display for BonusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BonusType::Meta(n) => write!(f, "{META_PREFIX}{n}"),
            BonusType::HotelMajestic => f.write_str(HOTEL_MAJESTIC),
        }
    }
}

impl FromStr for BonusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == HOTEL_MAJESTIC {
            return Ok(BonusType::HotelMajestic);
        }
        s.strip_prefix(META_PREFIX)
            .and_then(|n| n.parse::<i64>().ok())
            .filter(|n| *n > 0)
            .map(BonusType::Meta)
            .ok_or_else(|| ConversionError(format!("{s} is not a valid bonus type")))
    }
}

impl TryFrom<String> for BonusType {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BonusType> for String {
    fn from(value: BonusType) -> Self {
        value.to_string()
    }
}

//--------------------------------------        User           ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_blocked: bool,
    pub status: UserStatus,
    pub pix_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// A user that may not start new financial operations (orders, withdrawals, bookings)
    pub fn is_restricted(&self) -> bool {
        self.is_blocked || self.status != UserStatus::Ativa
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub pix_key: Option<String>,
}

/// Changes a user can make to their own profile. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub pix_key: Option<String>,
    pub password_hash: Option<String>,
}

impl UserProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.pix_key.is_none() && self.password_hash.is_none()
    }
}

//--------------------------------------      Products         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Centavos,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ProductVariation {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Centavos,
    pub image_url: Option<String>,
    #[serde(default)]
    pub variations: Vec<NewVariation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVariation {
    pub name: String,
    pub sku: Option<String>,
    #[serde(default)]
    pub stock: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Centavos>,
    pub image_url: Option<String>,
    pub active: Option<bool>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image_url.is_none()
            && self.active.is_none()
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub payment_plan: PaymentPlan,
    pub subtotal: Centavos,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of an order. Names and prices are copied from the catalog when the order is placed.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub variation_id: i64,
    pub product_name: String,
    pub variation_name: String,
    pub quantity: i64,
    pub unit_price: Centavos,
}

impl OrderItem {
    pub fn total(&self) -> Centavos {
        Centavos::from(self.unit_price.value() * self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub variation_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub items: Vec<NewOrderItem>,
    pub payment_plan: PaymentPlan,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
}

impl NewOrder {
    pub fn new(user_id: i64, payment_plan: PaymentPlan) -> Self {
        Self { user_id, items: vec![], payment_plan, shipping_address: None, notes: None }
    }

    pub fn with_item(mut self, variation_id: i64, quantity: i64) -> Self {
        self.items.push(NewOrderItem { variation_id, quantity });
        self
    }

    pub fn with_shipping_address<S: Into<String>>(mut self, address: S) -> Self {
        self.shipping_address = Some(address.into());
        self
    }
}

//--------------------------------------       Payment         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub payment_type: PaymentType,
    pub amount: Centavos,
    pub due_date: DateTime<Utc>,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub gateway_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      Commission       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Commission {
    pub id: i64,
    pub order_id: i64,
    pub user_id: i64,
    pub amount: Centavos,
    pub status: CommissionStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------        Bonus          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Bonus {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub bonus_type: BonusType,
    pub value: Centavos,
    pub status: BonusStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

//--------------------------------------     Withdrawals       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: i64,
    pub user_id: i64,
    pub amount: Centavos,
    pub pix_key: String,
    pub status: WithdrawalStatus,
    pub admin_note: Option<String>,
    /// Commissions and bonuses settled by this withdrawal. Zero until it is approved.
    pub paid_out: Centavos,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWithdrawal {
    pub user_id: i64,
    pub amount: Centavos,
    pub pix_key: String,
}

//--------------------------------------    Hotel bookings     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct HotelBooking {
    pub id: i64,
    pub user_id: i64,
    pub bonus_id: i64,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i64,
    pub status: BookingStatus,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHotelBooking {
    pub user_id: i64,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i64,
}

//--------------------------------------    Notifications      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i64,
    pub title: String,
    pub message: String,
}

impl NewNotification {
    pub fn new<T: Into<String>, M: Into<String>>(user_id: i64, title: T, message: M) -> Self {
        Self { user_id, title: title.into(), message: message.into() }
    }
}
