//! Filter state: a pure predicate over characters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::GalleryError;

/// Fields the filter predicate reads
pub trait Filterable {
    fn name(&self) -> &str;
    fn status(&self) -> &str;
    fn gender(&self) -> &str;
}

/// Life status filter; `All` is the wildcard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Alive,
    Dead,
    Unknown,
}

impl StatusFilter {
    pub const ALL: [Self; 4] = [Self::All, Self::Alive, Self::Dead, Self::Unknown];

    /// Upstream spelling, `None` for the wildcard
    pub fn as_upstream(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Alive => Some("Alive"),
            Self::Dead => Some("Dead"),
            Self::Unknown => Some("unknown"),
        }
    }

    pub fn matches(&self, status: &str) -> bool {
        self.as_upstream().map_or(true, |wanted| wanted == status)
    }

    /// Next option in dropdown order, wrapping around
    pub fn cycle_next(&self) -> Self {
        let index = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_upstream().unwrap_or("All Status"))
    }
}

impl FromStr for StatusFilter {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "all status" | "any" => Ok(Self::All),
            "alive" => Ok(Self::Alive),
            "dead" => Ok(Self::Dead),
            "unknown" => Ok(Self::Unknown),
            other => Err(GalleryError::Config(format!("unknown status filter: {}", other))),
        }
    }
}

/// Gender filter; `All` is the wildcard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenderFilter {
    #[default]
    All,
    Female,
    Male,
    Genderless,
    Unknown,
}

impl GenderFilter {
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Female,
        Self::Male,
        Self::Genderless,
        Self::Unknown,
    ];

    pub fn as_upstream(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Female => Some("Female"),
            Self::Male => Some("Male"),
            Self::Genderless => Some("Genderless"),
            Self::Unknown => Some("unknown"),
        }
    }

    pub fn matches(&self, gender: &str) -> bool {
        self.as_upstream().map_or(true, |wanted| wanted == gender)
    }

    pub fn cycle_next(&self) -> Self {
        let index = Self::ALL.iter().position(|g| g == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for GenderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_upstream().unwrap_or("All Genders"))
    }
}

impl FromStr for GenderFilter {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "all genders" | "any" => Ok(Self::All),
            "female" => Ok(Self::Female),
            "male" => Ok(Self::Male),
            "genderless" => Ok(Self::Genderless),
            "unknown" => Ok(Self::Unknown),
            other => Err(GalleryError::Config(format!("unknown gender filter: {}", other))),
        }
    }
}

/// Search term plus status and gender filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    pub status: StatusFilter,
    pub gender: GenderFilter,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_gender(mut self, gender: GenderFilter) -> Self {
        self.gender = gender;
        self
    }

    /// No search term and both dropdowns on their wildcard
    pub fn is_default(&self) -> bool {
        self.search.is_empty()
            && self.status == StatusFilter::All
            && self.gender == GenderFilter::All
    }

    /// Case-insensitive name substring, exact status and gender
    pub fn matches<I: Filterable + ?Sized>(&self, item: &I) -> bool {
        let matches_search = self.search.is_empty()
            || item.name().to_lowercase().contains(&self.search.to_lowercase());

        matches_search && self.status.matches(item.status()) && self.gender.matches(item.gender())
    }
}

/// Card label for a status; anything but Alive/Dead reads "Probably dead"
pub fn status_label(status: &str) -> &'static str {
    match status {
        "Alive" => "Alive",
        "Dead" => "Dead",
        _ => "Probably dead",
    }
}
