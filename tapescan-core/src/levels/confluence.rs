//! Confluence: key levels clustered around a price.

use crate::domain::KeyLevel;

/// Levels whose relative distance to `price` is within `tolerance`,
/// nearest first.
pub fn confluent_levels(price: f64, levels: &[KeyLevel], tolerance: f64) -> Vec<KeyLevel> {
    if !price.is_finite() || price <= 0.0 {
        return Vec::new();
    }
    let tolerance = tolerance.max(0.0);
    let mut nearby: Vec<KeyLevel> = levels
        .iter()
        .filter(|l| l.price.is_finite() && l.price > 0.0)
        .filter(|l| (price - l.price).abs() / price <= tolerance)
        .copied()
        .collect();
    nearby.sort_by(|a, b| (a.price - price).abs().total_cmp(&(b.price - price).abs()));
    nearby
}
