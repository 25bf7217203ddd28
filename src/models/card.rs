use serde::{Deserialize, Serialize};

use super::price::{Currency, MarketPrice};

// ---------------------------------------------------------------------------
// ScryfallCard - A single printing as returned by the Scryfall API
// ---------------------------------------------------------------------------

/// The subset of a Scryfall card object the price tracker reads.
///
/// Non-English printings commonly come back with every price set to `null`;
/// [`market_price`](Self::market_price) makes that an explicit `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScryfallCard {
    pub id: String,
    pub oracle_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub lang: String,
    pub set: Option<String>,
    pub collector_number: Option<String>,
    #[serde(default)]
    pub prices: CardPrices,
}

impl ScryfallCard {
    /// Current non-foil market price, preferring EUR over USD.
    pub fn market_price(&self) -> Option<MarketPrice> {
        self.prices.preferred()
    }

    pub fn is_english(&self) -> bool {
        self.lang == "en"
    }
}

// ---------------------------------------------------------------------------
// CardPrices - Decimal strings keyed by currency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardPrices {
    pub usd: Option<String>,
    pub usd_foil: Option<String>,
    pub usd_etched: Option<String>,
    pub eur: Option<String>,
    pub eur_foil: Option<String>,
    pub tix: Option<String>,
}

impl CardPrices {
    pub fn eur(&self) -> Option<MarketPrice> {
        parse_cents(self.eur.as_deref()).map(|cents| MarketPrice::new(cents, Currency::Eur))
    }

    pub fn usd(&self) -> Option<MarketPrice> {
        parse_cents(self.usd.as_deref()).map(|cents| MarketPrice::new(cents, Currency::Usd))
    }

    /// EUR if present, else USD. Only one currency is tracked at a time.
    pub fn preferred(&self) -> Option<MarketPrice> {
        self.eur().or_else(|| self.usd())
    }
}

/// Parse a Scryfall decimal string ("12.50") into cents.
///
/// Blank, unparsable, non-finite and non-positive values count as absent.
pub fn parse_cents(raw: Option<&str>) -> Option<i64> {
    let value: f64 = raw?.trim().parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Some((value * 100.0).round() as i64)
}

// ---------------------------------------------------------------------------
// ScryfallList - Paginated search envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScryfallList {
    #[serde(default)]
    pub data: Vec<ScryfallCard>,
    #[serde(default)]
    pub has_more: bool,
    pub total_cards: Option<i64>,
}
