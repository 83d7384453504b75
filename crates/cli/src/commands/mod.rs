//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod location;

pub use cart::CartAction;
pub use catalog::ProductsArgs;
pub use location::LocationAction;

use raiz_core::{INTEREST_FREE_INSTALLMENTS, Price};
use raiz_storefront::error::{Toast, ToastLevel};

/// Write one line of command output.
#[allow(clippy::print_stdout)]
pub fn say(line: impl std::fmt::Display) {
    println!("{line}");
}

/// Show a toast on stderr.
#[allow(clippy::print_stderr)]
pub fn notify(toast: &Toast) {
    let prefix = match toast.level {
        ToastLevel::Warning => "aviso",
        ToastLevel::Error => "erro",
    };
    eprintln!("{prefix}: {}", toast.message);
}

/// Price with the interest-free installment line (e.g., "R$ 89,90 ou 3x de R$ 29,97").
pub(crate) fn price_with_installments(price: &Price) -> String {
    format!(
        "{} ou {INTEREST_FREE_INSTALLMENTS}x de {} sem juros",
        price.format(),
        price.installment(INTEREST_FREE_INSTALLMENTS).format()
    )
}

#[cfg(test)]
mod tests {
    use raiz_core::CurrencyCode;
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_price_with_installments() {
        let price = Price::new(Decimal::new(8990, 2), CurrencyCode::BRL);
        assert_eq!(
            price_with_installments(&price),
            "R$ 89,90 ou 3x de R$ 29,97 sem juros"
        );
    }
}
