use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const CURRENCY_CODE: &str = "BRL";

//--------------------------------------     Centavos       ----------------------------------------------------------
/// An amount of Brazilian reais, held as an integer number of centavos.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Centavos(i64);

op!(binary Centavos, Add, add);
op!(binary Centavos, Sub, sub);
op!(inplace Centavos, AddAssign, add_assign);
op!(inplace Centavos, SubAssign, sub_assign);
op!(unary Centavos, Neg, neg);

impl Sum for Centavos {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a Centavos> for Centavos {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<i64> for Centavos {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Centavos {
    /// Formats as `R$ 1.234,56`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let reais = (abs / 100).to_string();
        let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
        for (i, c) in reais.chars().enumerate() {
            if i > 0 && (reais.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        write!(f, "{sign}R$ {grouped},{:02}", abs % 100)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Cannot parse '{0}' as an amount in reais")]
pub struct CentavosParseError(String);

impl FromStr for Centavos {
    type Err = CentavosParseError;

    /// Accepts `150`, `150.5`, `150,50` or `R$ 150,50`. A bare number is read as reais.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CentavosParseError(s.to_string());
        let trimmed = s.trim().trim_start_matches("R$").trim();
        let (neg, trimmed) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let normalized = trimmed.replace(',', ".");
        let (whole, frac) = match normalized.split_once('.') {
            Some((w, f)) => (w, f),
            None => (normalized.as_str(), ""),
        };
        if whole.is_empty() || frac.len() > 2 {
            return Err(err());
        }
        let whole = whole.parse::<i64>().map_err(|_| err())?;
        let frac = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| err())? * 10,
            _ => frac.parse::<i64>().map_err(|_| err())?,
        };
        let value = whole.checked_mul(100).and_then(|v| v.checked_add(frac)).ok_or_else(err)?;
        Ok(Self(if neg { -value } else { value }))
    }
}

impl Centavos {
    pub const fn value(&self) -> i64 {
        self.0
    }

    pub const fn from_reais(reais: i64) -> Self {
        Self(reais * 100)
    }

    /// `percent`% of this amount, rounded down to the centavo.
    pub fn percent(&self, percent: i64) -> Self {
        Self(self.0 * percent / 100)
    }

    /// Splits the amount into two parts; the first takes the odd centavo.
    pub fn split_in_half(&self) -> (Self, Self) {
        let first = (self.0 + 1) / 2;
        (Self(first), Self(self.0 - first))
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}
