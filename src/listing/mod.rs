//! Run parameters and listing sources
//!
//! This module defines the typed run parameters (category or country
//! selector, metric, concurrency level, result cap) and builds the URL of
//! the ranked listing page a run starts from.

mod countries;

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing run parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    #[error("Unknown metric '{0}' (expected mostsubscribed, ms, mostviewed or mv)")]
    UnknownMetric(String),

    #[error("Unknown ISO-3166 alpha-2 country code '{0}'")]
    UnknownCountry(String),

    #[error("Unsupported concurrency level '{0}' (expected one of 1, 5, 10, 15, 20, 25)")]
    UnsupportedConcurrency(String),

    #[error("Concurrency level must be at least 1")]
    ZeroConcurrency,

    #[error("Top cap must be between 1 and 250, got {0}")]
    TopOutOfRange(u16),
}

/// Channel category ranked by the listing source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Animals,
    Autos,
    Comedy,
    Education,
    Entertainment,
    Film,
    Games,
    Howto,
    Music,
    News,
    Nonprofit,
    People,
    Shows,
    Sports,
    Tech,
    Travel,
}

impl Category {
    pub const ALL: [Category; 16] = [
        Category::Animals,
        Category::Autos,
        Category::Comedy,
        Category::Education,
        Category::Entertainment,
        Category::Film,
        Category::Games,
        Category::Howto,
        Category::Music,
        Category::News,
        Category::Nonprofit,
        Category::People,
        Category::Shows,
        Category::Sports,
        Category::Tech,
        Category::Travel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Animals => "animals",
            Category::Autos => "autos",
            Category::Comedy => "comedy",
            Category::Education => "education",
            Category::Entertainment => "entertainment",
            Category::Film => "film",
            Category::Games => "games",
            Category::Howto => "howto",
            Category::Music => "music",
            Category::News => "news",
            Category::Nonprofit => "nonprofit",
            Category::People => "people",
            Category::Shows => "shows",
            Category::Sports => "sports",
            Category::Tech => "tech",
            Category::Travel => "travel",
        }
    }
}

impl FromStr for Category {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParameterError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranking metric of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    MostSubscribed,
    MostViewed,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::MostSubscribed => "mostsubscribed",
            Metric::MostViewed => "mostviewed",
        }
    }
}

/// Accepts the full metric names and the `ms` / `mv` shorthands
impl FromStr for Metric {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mostsubscribed" | "ms" => Ok(Metric::MostSubscribed),
            "mostviewed" | "mv" => Ok(Metric::MostViewed),
            other => Err(ParameterError::UnknownMetric(other.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase ISO-3166-1 alpha-2 country code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        if countries::is_alpha2(&code) {
            Ok(CountryCode(code))
        } else {
            Err(ParameterError::UnknownCountry(s.to_string()))
        }
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Target concurrency level of a run
///
/// Parsed from text, only the levels offered on the command line are
/// accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Concurrency(usize);

impl Concurrency {
    pub const LEVELS: [usize; 6] = [1, 5, 10, 15, 20, 25];

    /// Any positive level; the command line restricts itself to [`Self::LEVELS`]
    pub fn new(level: usize) -> Result<Self, ParameterError> {
        if level == 0 {
            return Err(ParameterError::ZeroConcurrency);
        }
        Ok(Concurrency(level))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Concurrency(10)
    }
}

impl FromStr for Concurrency {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = s
            .trim()
            .parse::<usize>()
            .map_err(|_| ParameterError::UnsupportedConcurrency(s.to_string()))?;
        if !Self::LEVELS.contains(&level) {
            return Err(ParameterError::UnsupportedConcurrency(s.to_string()));
        }
        Ok(Concurrency(level))
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default and bounds for the country-listing cap
pub const DEFAULT_TOP: u16 = 100;
pub const MAX_TOP: u16 = 250;

/// Which ranked listing a run reads its links from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSource {
    /// Top channels of a category; every listed link is resolved
    Category(Category),

    /// Top channels of a country, capped to the first `top` valid links
    Country { code: CountryCode, top: u16 },
}

impl ListingSource {
    pub fn country(code: CountryCode, top: u16) -> Result<Self, ParameterError> {
        if top == 0 || top > MAX_TOP {
            return Err(ParameterError::TopOutOfRange(top));
        }
        Ok(ListingSource::Country { code, top })
    }

    /// Builds the listing page URL on `base_url`
    pub fn listing_url(&self, base_url: &str, metric: Metric) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            ListingSource::Category(category) => {
                format!("{}/youtube/top/category/{}/{}", base, category, metric)
            }
            ListingSource::Country { code, .. } => {
                format!("{}/youtube/top/country/{}/{}", base, code, metric)
            }
        }
    }

    /// Maximum number of discovered links to resolve, if any
    pub fn cap(&self) -> Option<usize> {
        match self {
            ListingSource::Category(_) => None,
            ListingSource::Country { top, .. } => Some(*top as usize),
        }
    }
}

impl fmt::Display for ListingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingSource::Category(category) => write!(f, "Category: {}", category),
            ListingSource::Country { code, top } => {
                write!(f, "Country: {} | Top: {}", code, top)
            }
        }
    }
}

/// Parameters of one harvesting run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParameters {
    pub source: ListingSource,
    pub metric: Metric,
    pub concurrency: Concurrency,
}

impl fmt::Display for RunParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | Metric: {} | Threads: {}",
            self.source, self.metric, self.concurrency
        )
    }
}
