//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Number of interest-free installments the store advertises ("3x sem juros").
pub const INTEREST_FREE_INSTALLMENTS: u32 = 3;

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Value of a single installment when paying in `count` parts.
    ///
    /// Rounded to centavos. A `count` of zero is treated as one payment.
    #[must_use]
    pub fn installment(&self, count: u32) -> Self {
        let parts = Decimal::from(count.max(1));
        Self::new(
            (self.amount / parts).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            self.currency_code,
        )
    }

    /// Whole-percent discount of this price relative to a compare-at price.
    ///
    /// Returns 0 when the compare-at price is not above this price.
    #[must_use]
    pub fn discount_percent(&self, compare_at: &Self) -> u32 {
        if compare_at.amount <= self.amount || compare_at.amount <= Decimal::ZERO {
            return 0;
        }

        ((compare_at.amount - self.amount) / compare_at.amount * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0)
    }

    /// Format for display (e.g., "R$ 1.234,56" or "$19.99").
    #[must_use]
    pub fn format(&self) -> String {
        let rounded = self.amount.round_dp(2);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let digits = format!("{:.2}", rounded.abs());
        let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        let (group_sep, decimal_sep) = self.currency_code.separators();
        let grouped = group_thousands(whole, group_sep);
        let sign = if negative { "-" } else { "" };

        format!(
            "{sign}{}{grouped}{decimal_sep}{cents}",
            self.currency_code.symbol()
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

fn group_thousands(whole: &str, separator: char) -> String {
    let len = whole.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol, including any trailing space.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::BRL => "R$ ",
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// ISO code as a string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BRL => "BRL",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// (thousands, decimal) separators used when formatting.
    const fn separators(self) -> (char, char) {
        match self {
            Self::BRL | Self::EUR => ('.', ','),
            Self::USD | Self::GBP | Self::CAD | Self::AUD => (',', '.'),
        }
    }
}

/// Error returned for currency codes the store does not sell in.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct UnsupportedCurrency(pub String);

impl FromStr for CurrencyCode {
    type Err = UnsupportedCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Self::BRL),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(UnsupportedCurrency(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn brl(amount: &str) -> Price {
        Price::new(amount.parse().unwrap(), CurrencyCode::BRL)
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(brl("89.9").format(), "R$ 89,90");
        assert_eq!(brl("0").format(), "R$ 0,00");
        assert_eq!(brl("1234.567").format(), "R$ 1.234,57");
        assert_eq!(brl("1000000").format(), "R$ 1.000.000,00");
    }

    #[test]
    fn test_format_usd() {
        let price = Price::new("19.99".parse().unwrap(), CurrencyCode::USD);
        assert_eq!(price.to_string(), "$19.99");

        let price = Price::new("12345.5".parse().unwrap(), CurrencyCode::USD);
        assert_eq!(price.format(), "$12,345.50");
    }

    #[test]
    fn test_times() {
        assert_eq!(brl("29.90").times(3).amount, "89.70".parse().unwrap());
        assert_eq!(brl("29.90").times(0).amount, Decimal::ZERO);
    }

    #[test]
    fn test_installment_rounds_to_cents() {
        assert_eq!(brl("100").installment(3).format(), "R$ 33,33");
        assert_eq!(
            brl("89.90").installment(INTEREST_FREE_INSTALLMENTS).format(),
            "R$ 29,97"
        );
        assert_eq!(brl("50").installment(0).format(), "R$ 50,00");
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(brl("79.90").discount_percent(&brl("99.90")), 20);
        assert_eq!(brl("50").discount_percent(&brl("100")), 50);
        // Compare-at below or equal to price is not a discount
        assert_eq!(brl("100").discount_percent(&brl("100")), 0);
        assert_eq!(brl("100").discount_percent(&brl("80")), 0);
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("brl".parse::<CurrencyCode>().unwrap(), CurrencyCode::BRL);
        assert_eq!("USD".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_serde_amount_as_string() {
        let json = serde_json::to_string(&brl("89.90")).unwrap();
        assert_eq!(json, r#"{"amount":"89.90","currency_code":"BRL"}"#);
    }
}
