mod cpf;
mod passwords;

use std::sync::OnceLock;

pub use cpf::{format_cpf, normalize_cpf, CpfError};
pub use passwords::{hash_password, verify_password, PasswordError};
use regex::Regex;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

/// A deliberately loose check: something before and after a single `@`, and a dot in the domain.
pub fn is_valid_email(email: &str) -> bool {
    let re = EMAIL_REGEX.get_or_init(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap()
    });
    re.is_match(email)
}
