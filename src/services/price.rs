//! Mock price table.
//!
//! Deterministic prices used whenever live aggregator data is unavailable.

use rust_decimal::Decimal;

/// Mock WETH price in DAI.
pub const WETH_DAI_PRICE: Decimal = Decimal::from_parts(2000, 0, 0, false, 0);

/// Fixed price table with symmetric forward/inverse entries.
#[derive(Debug, Clone)]
pub struct MockPriceTable {
    /// (base, quote, units of quote per unit of base)
    pairs: Vec<(String, String, Decimal)>,
}

impl Default for MockPriceTable {
    fn default() -> Self {
        Self::new().with_pair("WETH", "DAI", WETH_DAI_PRICE)
    }
}

impl MockPriceTable {
    /// Empty table: every pair prices at 1.
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Add a pair; the inverse is derived so forward × inverse = 1.
    pub fn with_pair(mut self, base: &str, quote: &str, price: Decimal) -> Self {
        self.pairs.push((base.to_string(), quote.to_string(), price));
        self
    }

    /// Units of `to` per unit of `from`. Unknown pairs default to 1.
    pub fn price(&self, from: &str, to: &str) -> Decimal {
        for (base, quote, price) in &self.pairs {
            if base == from && quote == to {
                return *price;
            }
            if base == to && quote == from && !price.is_zero() {
                return Decimal::ONE / *price;
            }
        }
        Decimal::ONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weth_dai_price() {
        let table = MockPriceTable::default();
        assert_eq!(table.price("WETH", "DAI"), Decimal::from(2000));
    }

    #[test]
    fn test_dai_weth_is_inverse() {
        let table = MockPriceTable::default();
        let inverse = table.price("DAI", "WETH");
        assert_eq!(inverse, Decimal::new(5, 4)); // 0.0005
        assert_eq!(table.price("WETH", "DAI") * inverse, Decimal::ONE);
    }

    #[test]
    fn test_unlisted_pairs_default_to_one() {
        let table = MockPriceTable::default();
        assert_eq!(table.price("DAI", "USDC"), Decimal::ONE);
        assert_eq!(table.price("WETH", "WETH"), Decimal::ONE);
        assert_eq!(table.price("FOO", "BAR"), Decimal::ONE);
    }

    #[test]
    fn test_custom_pair() {
        let table = MockPriceTable::new().with_pair("WETH", "USDC", Decimal::from(2500));
        assert_eq!(table.price("USDC", "WETH"), Decimal::new(4, 4)); // 0.0004
    }
}
