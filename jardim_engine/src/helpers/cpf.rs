//! Brazilian individual taxpayer number (CPF) validation.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpfError {
    #[error("A CPF has 11 digits, but {0} were given")]
    WrongLength(usize),
    #[error("A CPF cannot consist of a single repeated digit")]
    RepeatedDigits,
    #[error("The CPF check digits do not match")]
    InvalidCheckDigits,
}

/// Strips punctuation from a CPF and checks its verification digits, returning the 11 bare digits.
pub fn normalize_cpf(cpf: &str) -> Result<String, CpfError> {
    let digits = cpf.chars().filter(char::is_ascii_digit).filter_map(|c| c.to_digit(10)).collect::<Vec<u32>>();
    if digits.len() != 11 {
        return Err(CpfError::WrongLength(digits.len()));
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return Err(CpfError::RepeatedDigits);
    }
    if check_digit(&digits[..9]) != digits[9] || check_digit(&digits[..10]) != digits[10] {
        return Err(CpfError::InvalidCheckDigits);
    }
    Ok(digits.iter().map(|d| char::from(b'0' + *d as u8)).collect())
}

fn check_digit(digits: &[u32]) -> u32 {
    let weight_start = digits.len() as u32 + 1;
    let sum: u32 = digits.iter().enumerate().map(|(i, d)| d * (weight_start - i as u32)).sum();
    match (sum * 10) % 11 {
        10 => 0,
        d => d,
    }
}

/// Formats 11 bare digits as `000.000.000-00`. Anything else is returned as is.
pub fn format_cpf(cpf: &str) -> String {
    if cpf.len() != 11 || !cpf.chars().all(|c| c.is_ascii_digit()) {
        return cpf.to_string();
    }
    format!("{}.{}.{}-{}", &cpf[0..3], &cpf[3..6], &cpf[6..9], &cpf[9..11])
}
