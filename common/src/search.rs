//! Hotel search pipeline.
//!
//! The catalog listing loads every hotel and narrows it down here: all
//! filter predicates must pass, then the survivors are ordered by the
//! requested [`SortKey`]. Everything in this module is pure.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::Hotel;
use crate::utils::text::{contains_ignore_case, matches_any};

/// Result ordering for the hotel listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Nightly price, low to high.
    #[default]
    PriceAsc,
    /// Nightly price, high to low.
    PriceDesc,
    /// Guest rating, high to low; unrated counts as 0.
    RatingDesc,
    /// Star classification, high to low.
    StarsDesc,
}

impl SortKey {
    /// Parses a sort key, falling back to [`SortKey::PriceAsc`] for anything unknown.
    pub fn parse(key: &str) -> Self {
        match key.trim() {
            "price_desc" => SortKey::PriceDesc,
            "rating_desc" => SortKey::RatingDesc,
            "stars_desc" => SortKey::StarsDesc,
            _ => SortKey::PriceAsc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::RatingDesc => "rating_desc",
            SortKey::StarsDesc => "stars_desc",
        }
    }

    fn compare(&self, a: &Hotel, b: &Hotel) -> Ordering {
        match self {
            SortKey::PriceAsc => a.price_per_night.total_cmp(&b.price_per_night),
            SortKey::PriceDesc => b.price_per_night.total_cmp(&a.price_per_night),
            SortKey::RatingDesc => b.effective_rating().total_cmp(&a.effective_rating()),
            SortKey::StarsDesc => b.stars.cmp(&a.stars),
        }
    }
}

/// Filter selection for the hotel listing. `Default` matches every hotel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotelFilters {
    /// Free text matched against name, description and city.
    pub search: String,
    /// Exact city match.
    pub city: Option<String>,
    /// Accepted star values; empty accepts all.
    pub stars: Vec<u8>,
    /// Inclusive lower price bound.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
    /// Amenity identifiers that must all be present.
    pub amenities: Vec<String>,
}

impl HotelFilters {
    /// True when `hotel` passes every predicate.
    pub fn matches(&self, hotel: &Hotel) -> bool {
        self.matches_search(hotel)
            && self.matches_city(hotel)
            && self.matches_stars(hotel)
            && self.matches_price(hotel)
            && self.matches_amenities(hotel)
    }

    fn matches_search(&self, hotel: &Hotel) -> bool {
        matches_any(
            &self.search,
            [
                hotel.name.as_str(),
                hotel.description.as_str(),
                hotel.city.as_str(),
            ],
        )
    }

    fn matches_city(&self, hotel: &Hotel) -> bool {
        match self.city.as_deref() {
            None | Some("") => true,
            Some(city) => hotel.city == city,
        }
    }

    fn matches_stars(&self, hotel: &Hotel) -> bool {
        self.stars.is_empty() || self.stars.contains(&hotel.stars)
    }

    fn matches_price(&self, hotel: &Hotel) -> bool {
        let price = hotel.price_per_night;
        self.min_price.map_or(true, |min| price >= min)
            && self.max_price.map_or(true, |max| price <= max)
    }

    // Each selected amenity needs a substring hit on at least one label.
    fn matches_amenities(&self, hotel: &Hotel) -> bool {
        self.amenities.iter().all(|wanted| {
            hotel
                .amenities
                .iter()
                .any(|label| contains_ignore_case(label, wanted))
        })
    }
}

/// Runs the pipeline: keep hotels matching `filters`, then order by `sort`.
///
/// The sort is stable, so hotels that compare equal keep their input order.
pub fn filter_and_sort_hotels(
    hotels: &[Hotel],
    filters: &HotelFilters,
    sort: SortKey,
) -> Vec<Hotel> {
    let mut matched: Vec<Hotel> = hotels
        .iter()
        .filter(|hotel| filters.matches(hotel))
        .cloned()
        .collect();
    matched.sort_by(|a, b| sort.compare(a, b));
    matched
}

/// Unique, non-empty cities in order of first appearance.
pub fn distinct_cities(hotels: &[Hotel]) -> Vec<String> {
    let mut cities: Vec<String> = Vec::new();
    for hotel in hotels {
        if !hotel.city.is_empty() && !cities.contains(&hotel.city) {
            cities.push(hotel.city.clone());
        }
    }
    cities
}

/// Query string of `GET /api/hotels`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HotelSearchParams {
    /// Free-text search term.
    pub q: Option<String>,
    /// Exact city.
    pub city: Option<String>,
    /// Comma-separated star values, e.g. `4,5`.
    pub stars: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Comma-separated amenity identifiers, e.g. `wifi,pool`.
    pub amenities: Option<String>,
    /// `price_asc` (default), `price_desc`, `rating_desc` or `stars_desc`.
    pub sort: Option<String>,
}

impl HotelSearchParams {
    /// Splits the query into filters and sort key. Unparsable star values
    /// and empty amenity entries are ignored.
    pub fn into_filters(self) -> (HotelFilters, SortKey) {
        let stars = split_list(self.stars.as_deref())
            .filter_map(|s| s.parse::<u8>().ok())
            .collect();
        let amenities = split_list(self.amenities.as_deref())
            .map(str::to_string)
            .collect();

        let filters = HotelFilters {
            search: self.q.unwrap_or_default().trim().to_string(),
            city: self.city.filter(|c| !c.trim().is_empty()),
            stars,
            min_price: self.min_price,
            max_price: self.max_price,
            amenities,
        };
        let sort = self.sort.as_deref().map(SortKey::parse).unwrap_or_default();
        (filters, sort)
    }
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Response body of the hotel listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct HotelSearchResult {
    /// Matching hotels, in the requested order.
    pub items: Vec<Hotel>,
    /// Number of matching hotels.
    pub total: usize,
    /// Cities across the whole catalog, for the city filter.
    pub cities: Vec<String>,
    pub sort: SortKey,
}
