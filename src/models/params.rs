// ============================================================================
// Paramètres de requête : devise et période
// ============================================================================

use serde::{Deserialize, Serialize};

/// Devise de cotation (`vs_currency` côté API)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    /// Code attendu par l'API ("usd", "eur", "gbp")
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Eur => "eur",
            Currency::Gbp => "gbp",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    /// Cycle USD → EUR → GBP → USD (touche `c`)
    pub fn next(&self) -> Self {
        match self {
            Currency::Usd => Currency::Eur,
            Currency::Eur => Currency::Gbp,
            Currency::Gbp => Currency::Usd,
        }
    }

    /// Formatte un montant : "$1234.57"
    pub fn format(&self, value: f64) -> String {
        format!("{}{:.2}", self.symbol(), value)
    }
}

/// Période couverte par le graphique de détail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DayRange {
    Week,
    #[default]
    Month,
    Quarter,
}

impl DayRange {
    /// Nombre de jours (paramètre `days` de l'API)
    pub fn days(&self) -> u32 {
        match self {
            DayRange::Week => 7,
            DayRange::Month => 30,
            DayRange::Quarter => 90,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DayRange::Week => "7 Days",
            DayRange::Month => "30 Days",
            DayRange::Quarter => "90 Days",
        }
    }

    /// Période suivante (touche `l`), bornée à 90 jours
    pub fn next(&self) -> Self {
        match self {
            DayRange::Week => DayRange::Month,
            DayRange::Month | DayRange::Quarter => DayRange::Quarter,
        }
    }

    /// Période précédente (touche `h`), bornée à 7 jours
    pub fn previous(&self) -> Self {
        match self {
            DayRange::Quarter => DayRange::Month,
            DayRange::Month | DayRange::Week => DayRange::Week,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_cycle() {
        let c = Currency::default();
        assert_eq!(c, Currency::Usd);
        assert_eq!(c.next(), Currency::Eur);
        assert_eq!(c.next().next().next(), Currency::Usd);
        assert_eq!(Currency::Gbp.code(), "gbp");
    }

    #[test]
    fn test_currency_format() {
        assert_eq!(Currency::Eur.format(1234.567), "€1234.57");
    }

    #[test]
    fn test_day_range_bounds() {
        assert_eq!(DayRange::default().days(), 30);
        assert_eq!(DayRange::Quarter.next(), DayRange::Quarter);
        assert_eq!(DayRange::Week.previous(), DayRange::Week);
        assert_eq!(DayRange::Week.next().next().days(), 90);
    }
}
