use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use jardim_engine::{
    AuthApiError,
    CatalogError,
    NotificationError,
    ReportsError,
    RewardsError,
    SalesError,
    UserApiError,
};
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Could not issue access token. {0}")]
    CouldNotSerializeAccessToken(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    Conflict(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::UNAUTHORIZED,
                AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
                AuthError::AccountInactive => StatusCode::FORBIDDEN,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            },
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CouldNotSerializeAccessToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("💻️ {self}");
        }
        let error = status.canonical_reason().unwrap_or("Error");
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": error, "details": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Invalid e-mail or password.")]
    InvalidCredentials,
    #[error("This account has been deactivated.")]
    AccountInactive,
    #[error("No access token was provided.")]
    MissingToken,
    #[error("The access token has expired.")]
    TokenExpired,
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Access token signature is invalid. {0}")]
    ValidationError(String),
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::InvalidCredentials => Self::AuthenticationError(AuthError::InvalidCredentials),
            AuthApiError::AccountInactive => Self::AuthenticationError(AuthError::AccountInactive),
            AuthApiError::EmailAlreadyRegistered(_) | AuthApiError::CpfAlreadyRegistered => {
                Self::Conflict(e.to_string())
            },
            AuthApiError::ValidationError(_) => Self::ValidationError(e.to_string()),
            AuthApiError::DatabaseError(_) | AuthApiError::PasswordError(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<UserApiError> for ServerError {
    fn from(e: UserApiError) -> Self {
        match e {
            UserApiError::DatabaseError(_) => Self::BackendError(e.to_string()),
            UserApiError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
            UserApiError::EmailAlreadyRegistered(_) | UserApiError::CpfAlreadyRegistered => {
                Self::Conflict(e.to_string())
            },
            UserApiError::ValidationError(_) | UserApiError::UserModificationNoOp => {
                Self::ValidationError(e.to_string())
            },
        }
    }
}

impl From<CatalogError> for ServerError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::DatabaseError(_) => Self::BackendError(e.to_string()),
            CatalogError::ProductNotFound(_) | CatalogError::VariationNotFound(_) => Self::NoRecordFound(e.to_string()),
            CatalogError::DuplicateSku(_) => Self::Conflict(e.to_string()),
            CatalogError::ValidationError(_) | CatalogError::ProductModificationNoOp => {
                Self::ValidationError(e.to_string())
            },
        }
    }
}

impl From<SalesError> for ServerError {
    fn from(e: SalesError) -> Self {
        use SalesError::*;
        match e {
            DatabaseError(_) => Self::BackendError(e.to_string()),
            UserNotFound(_) | VariationNotFound(_) | OrderNotFound(_) | PaymentNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            UserBlocked(_) => Self::InsufficientPermissions(e.to_string()),
            EmptyOrder |
            InvalidQuantity(_) |
            ProductInactive(_) |
            InsufficientStock { .. } |
            BelowMinimumOrder { .. } |
            QueryError(_) |
            InvalidGatewayNotification(_) => Self::ValidationError(e.to_string()),
            OrderModificationNoOp |
            OrderModificationForbidden { .. } |
            PaymentModificationNoOp |
            PaymentModificationForbidden(_) => Self::Conflict(e.to_string()),
        }
    }
}

impl From<RewardsError> for ServerError {
    fn from(e: RewardsError) -> Self {
        use RewardsError::*;
        match e {
            DatabaseError(_) => Self::BackendError(e.to_string()),
            UserNotFound(_) | WithdrawalNotFound(_) | BookingNotFound(_) => Self::NoRecordFound(e.to_string()),
            UserBlocked(_) => Self::InsufficientPermissions(e.to_string()),
            InvalidAmount | MissingPixKey | InsufficientBalance { .. } | NoHotelAward(_) | InvalidBooking(_) => {
                Self::ValidationError(e.to_string())
            },
            WithdrawalAlreadyDecided(..) | BookingAlreadyOpen | BookingModificationForbidden(..) => {
                Self::Conflict(e.to_string())
            },
        }
    }
}

impl From<NotificationError> for ServerError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::DatabaseError(_) => Self::BackendError(e.to_string()),
            NotificationError::NotificationNotFound(_) => Self::NoRecordFound(e.to_string()),
        }
    }
}

impl From<ReportsError> for ServerError {
    fn from(e: ReportsError) -> Self {
        match e {
            ReportsError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
            ReportsError::DatabaseError(_) | ReportsError::ExportError(_) => Self::BackendError(e.to_string()),
        }
    }
}
