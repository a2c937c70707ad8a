//! Display currencies and USD exchange rates

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Supported display currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Jpy,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Gbp, Currency::Jpy];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Jpy => "¥",
        }
    }

    /// Built-in USD -> currency rate
    pub fn default_rate(&self) -> f64 {
        match self {
            Currency::Usd => 1.0,
            Currency::Eur => 0.92,
            Currency::Gbp => 0.79,
            Currency::Jpy => 149.50,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "JPY" => Ok(Currency::Jpy),
            other => Err(format!(
                "Unknown currency '{}'. Valid values: USD, EUR, GBP, JPY",
                other
            )),
        }
    }
}

/// USD exchange table with optional overrides
#[derive(Debug, Clone)]
pub struct ExchangeRates {
    rates: HashMap<Currency, f64>,
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self {
            rates: Currency::ALL.iter().map(|c| (*c, c.default_rate())).collect(),
        }
    }
}

impl ExchangeRates {
    /// Built-in table with config overrides applied. Unknown codes are skipped.
    pub fn with_overrides(overrides: &BTreeMap<String, f64>) -> Self {
        let mut table = Self::default();
        for (code, rate) in overrides {
            match code.parse::<Currency>() {
                Ok(currency) => {
                    table.rates.insert(currency, *rate);
                }
                Err(e) => warn!(code = %code, "Ignoring exchange rate override: {}", e),
            }
        }
        table
    }

    pub fn set(&mut self, currency: Currency, rate: f64) {
        self.rates.insert(currency, rate);
    }

    /// Rate from USD to `currency`; 1.0 when absent
    pub fn rate(&self, currency: Currency) -> f64 {
        self.rates.get(&currency).copied().unwrap_or(1.0)
    }
}
