use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub name: String,
    pub price: f64,

    // invariant: never negative
    pub stock: i64,
}

impl Product {
    /// The stock value after removing `amount` units, or `None` when the
    /// product cannot cover the amount. This is the only place the
    /// insufficient-stock decision is made; the catalog service applies the
    /// result with a guarded update so the stored stock can never go negative.
    pub fn stock_after_reduction(&self, amount: i64) -> Option<i64> {
        if amount >= 1 && self.stock >= amount {
            Some(self.stock - amount)
        } else {
            None
        }
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn product(stock: i64) -> Product {
        Product {
            id: ObjectId::new(),
            name: "Tomato".to_string(),
            price: 1.15,
            stock,
        }
    }

    #[test]
    fn reduction_within_stock_decrements_exactly() {
        let p = product(10);
        assert_eq!(p.stock_after_reduction(3), Some(7));
    }

    #[test]
    fn reduction_beyond_stock_is_rejected_and_stock_unchanged() {
        let mut p = product(10);
        p.stock = p.stock_after_reduction(3).unwrap();
        assert_eq!(p.stock, 7);

        // The follow-up over-order fails and must not touch stock.
        assert_eq!(p.stock_after_reduction(8), None);
        assert_eq!(p.stock, 7);
    }

    #[test]
    fn reduction_can_empty_stock_but_never_go_negative() {
        let p = product(5);
        assert_eq!(p.stock_after_reduction(5), Some(0));
        assert_eq!(p.stock_after_reduction(6), None);

        let empty = product(0);
        assert_eq!(empty.stock_after_reduction(1), None);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let p = product(10);
        assert_eq!(p.stock_after_reduction(0), None);
        assert_eq!(p.stock_after_reduction(-4), None);
    }

    #[test]
    fn restock_then_reduce_matches_reduce_then_restock_when_both_fit() {
        // stock=10: +5 then -8, and -8 then +5, both land on 7.
        let mut a = product(10);
        a.stock += 5;
        a.stock = a.stock_after_reduction(8).unwrap();
        assert_eq!(a.stock, 7);

        let mut b = product(10);
        b.stock = b.stock_after_reduction(8).unwrap();
        b.stock += 5;
        assert_eq!(b.stock, 7);
    }

    #[test]
    fn two_reductions_cannot_both_fit_insufficient_stock() {
        // Two orders of 8 against stock=10: whichever lands first wins,
        // the second must be rejected.
        let mut p = product(10);
        p.stock = p.stock_after_reduction(8).unwrap();
        assert_eq!(p.stock, 2);
        assert_eq!(p.stock_after_reduction(8), None);
    }

    #[test]
    fn in_stock_reflects_availability() {
        assert!(product(1).in_stock());
        assert!(!product(0).in_stock());
    }
}
