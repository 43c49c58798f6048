// ============================================================================
// Structure : PriceSeries
// ============================================================================
// Historique des prix d'une cryptomonnaie (`/coins/{id}/market_chart`)
//
// L'API renvoie des paires [timestamp_ms, prix]. On garantit l'ordre
// chronologique croissant à la construction.
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Un point de l'historique
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Timestamp Unix en millisecondes
    pub timestamp_ms: i64,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp_ms: i64, price: f64) -> Self {
        Self {
            timestamp_ms,
            price,
        }
    }

    /// Convertit le timestamp en DateTime<Utc> (None si hors bornes)
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}

/// Série de prix triée par timestamp croissant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Crée une série à partir de points dans n'importe quel ordre
    ///
    /// Le tri est stable : deux points au même timestamp gardent leur ordre.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.timestamp_ms);
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Prix minimum et maximum de la série (None si vide)
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }

        Some(self.points.iter().fold(
            (f64::MAX, f64::MIN),
            |(min, max), p| (min.min(p.price), max.max(p.price)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_by_timestamp() {
        let series = PriceSeries::new(vec![
            PricePoint::new(3_000, 3.0),
            PricePoint::new(1_000, 1.0),
            PricePoint::new(2_000, 2.0),
        ]);

        let timestamps: Vec<i64> = series.points().iter().map(|p| p.timestamp_ms).collect();
        assert_eq!(timestamps, vec![1_000, 2_000, 3_000]);
        assert_eq!(series.last().map(|p| p.price), Some(3.0));
    }

    #[test]
    fn test_price_bounds() {
        let series = PriceSeries::new(vec![
            PricePoint::new(1, 10.0),
            PricePoint::new(2, 4.0),
            PricePoint::new(3, 12.5),
        ]);
        assert_eq!(series.price_bounds(), Some((4.0, 12.5)));
        assert_eq!(PriceSeries::default().price_bounds(), None);
    }

    #[test]
    fn test_datetime_conversion() {
        let point = PricePoint::new(1_700_000_000_000, 1.0);
        let dt = point.datetime().unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }
}
