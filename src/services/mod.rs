pub mod cart;
pub mod checkout;
pub mod favorites;

/// Rounds a money amount to cents.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
