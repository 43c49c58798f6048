// ============================================================================
// Moteur de requête sur les listes
// ============================================================================
// Dérive la tranche visible d'une liste brute :
//   filtre (recherche) → tri (clé) → pagination (page, taille)
//
// `derive` est une fonction pure : elle ne modifie ni la source ni les
// paramètres. Le retour à la page 1 quand la recherche, le tri ou la source
// changent est à la charge de l'appelant (voir QueryParams::set_*).
// ============================================================================

use std::cmp::Ordering;

use crate::models::{CoinSummary, Exchange};

/// Entité filtrable par son nom affiché
pub trait Searchable {
    fn display_name(&self) -> &str;
}

/// Clé de tri : un champ et une direction
pub trait SortKey<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// Paramètres de la vue : recherche, tri, page courante, taille de page
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams<K> {
    pub search_text: String,
    pub sort_key: K,
    /// Page courante, à partir de 1
    pub page: usize,
    pub page_size: usize,
}

impl<K> QueryParams<K> {
    pub fn new(sort_key: K, page_size: usize) -> Self {
        Self {
            search_text: String::new(),
            sort_key,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Change la recherche ; retourne à la page 1
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.page = 1;
    }

    /// Change la clé de tri ; retourne à la page 1
    pub fn set_sort_key(&mut self, key: K) {
        self.sort_key = key;
        self.page = 1;
    }

    /// À appeler quand la liste source est remplacée
    pub fn reset_page(&mut self) {
        self.page = 1;
    }

    /// Page suivante, sans dépasser `page_count`
    pub fn next_page(&mut self, page_count: usize) {
        self.page = (self.page + 1).min(page_count.max(1));
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }
}

/// Résultat de `derive` : la tranche visible et son contexte de pagination
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: Vec<&'a T>,
    /// Page effectivement affichée (après bornage)
    pub page: usize,
    /// Toujours >= 1, même pour une liste vide
    pub page_count: usize,
    /// Nombre d'éléments après filtrage
    pub total: usize,
}

impl<'a, T> Page<'a, T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Nombre de pages pour `len` éléments : ceil(len / page_size), au moins 1
pub fn page_count(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// Test de recherche : sous-chaîne, insensible à la casse
pub fn matches_search<T: Searchable>(item: &T, search_text: &str) -> bool {
    if search_text.is_empty() {
        return true;
    }

    item.display_name()
        .to_lowercase()
        .contains(&search_text.to_lowercase())
}

/// Filtre, trie et pagine `source` selon `params`
///
/// Le tri est stable : à clé égale, l'ordre de la source est conservé.
/// Une page hors bornes est ramenée silencieusement dans [1, page_count].
///
/// CONCEPT RUST : Lifetimes
/// - `Page<'a, T>` contient des `&'a T` empruntés à `source`
/// - aucune copie des éléments : on trie et on découpe des références
/// - tant que la Page existe, `source` ne peut pas être modifiée
pub fn derive<'a, T, K>(source: &'a [T], params: &QueryParams<K>) -> Page<'a, T>
where
    T: Searchable,
    K: SortKey<T>,
{
    let mut filtered: Vec<&T> = source
        .iter()
        .filter(|item| matches_search(*item, &params.search_text))
        .collect();

    // sort_by est stable
    filtered.sort_by(|a, b| params.sort_key.compare(a, b));

    let total = filtered.len();
    let page_size = params.page_size.max(1);
    let page_count = page_count(total, page_size);
    let page = params.page.clamp(1, page_count);

    let start = (page - 1) * page_size;
    let items: Vec<&T> = filtered.into_iter().skip(start).take(page_size).collect();

    Page {
        items,
        page,
        page_count,
        total,
    }
}

// ============================================================================
// Clés de tri
// ============================================================================

/// Tri de la liste des cryptomonnaies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoinSort {
    #[default]
    MarketCapDesc,
    MarketCapAsc,
    PriceDesc,
    PriceAsc,
}

impl CoinSort {
    pub const ALL: [CoinSort; 4] = [
        CoinSort::MarketCapDesc,
        CoinSort::MarketCapAsc,
        CoinSort::PriceDesc,
        CoinSort::PriceAsc,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CoinSort::MarketCapDesc => "market_cap_desc",
            CoinSort::MarketCapAsc => "market_cap_asc",
            CoinSort::PriceDesc => "price_desc",
            CoinSort::PriceAsc => "price_asc",
        }
    }

    /// Valeur du paramètre `order` de `/coins/markets`
    ///
    /// L'API ne sait pas trier par prix : on demande alors les plus grosses
    /// capitalisations et le tri par prix se fait côté client.
    pub fn api_order(&self) -> &'static str {
        match self {
            CoinSort::MarketCapAsc => "market_cap_asc",
            CoinSort::MarketCapDesc | CoinSort::PriceDesc | CoinSort::PriceAsc => {
                "market_cap_desc"
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CoinSort::MarketCapDesc => "Market Cap (High to Low)",
            CoinSort::MarketCapAsc => "Market Cap (Low to High)",
            CoinSort::PriceDesc => "Price (High to Low)",
            CoinSort::PriceAsc => "Price (Low to High)",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            CoinSort::MarketCapDesc => CoinSort::MarketCapAsc,
            CoinSort::MarketCapAsc => CoinSort::PriceDesc,
            CoinSort::PriceDesc => CoinSort::PriceAsc,
            CoinSort::PriceAsc => CoinSort::MarketCapDesc,
        }
    }
}

impl SortKey<CoinSummary> for CoinSort {
    fn compare(&self, a: &CoinSummary, b: &CoinSummary) -> Ordering {
        match self {
            CoinSort::MarketCapDesc => b.market_cap.total_cmp(&a.market_cap),
            CoinSort::MarketCapAsc => a.market_cap.total_cmp(&b.market_cap),
            CoinSort::PriceDesc => b.current_price.total_cmp(&a.current_price),
            CoinSort::PriceAsc => a.current_price.total_cmp(&b.current_price),
        }
    }
}

/// Tri de la liste des plateformes d'échange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExchangeSort {
    #[default]
    VolumeDesc,
    VolumeAsc,
    TrustDesc,
    TrustAsc,
}

impl ExchangeSort {
    pub const ALL: [ExchangeSort; 4] = [
        ExchangeSort::VolumeDesc,
        ExchangeSort::VolumeAsc,
        ExchangeSort::TrustDesc,
        ExchangeSort::TrustAsc,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ExchangeSort::VolumeDesc => "volume_desc",
            ExchangeSort::VolumeAsc => "volume_asc",
            ExchangeSort::TrustDesc => "trust_desc",
            ExchangeSort::TrustAsc => "trust_asc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExchangeSort::VolumeDesc => "Volume (High to Low)",
            ExchangeSort::VolumeAsc => "Volume (Low to High)",
            ExchangeSort::TrustDesc => "Trust Score (High to Low)",
            ExchangeSort::TrustAsc => "Trust Score (Low to High)",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ExchangeSort::VolumeDesc => ExchangeSort::VolumeAsc,
            ExchangeSort::VolumeAsc => ExchangeSort::TrustDesc,
            ExchangeSort::TrustDesc => ExchangeSort::TrustAsc,
            ExchangeSort::TrustAsc => ExchangeSort::VolumeDesc,
        }
    }
}

impl SortKey<Exchange> for ExchangeSort {
    fn compare(&self, a: &Exchange, b: &Exchange) -> Ordering {
        match self {
            ExchangeSort::VolumeDesc => b.trade_volume_24h_btc.total_cmp(&a.trade_volume_24h_btc),
            ExchangeSort::VolumeAsc => a.trade_volume_24h_btc.total_cmp(&b.trade_volume_24h_btc),
            ExchangeSort::TrustDesc => b.trust_score.cmp(&a.trust_score),
            ExchangeSort::TrustAsc => a.trust_score.cmp(&b.trust_score),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
