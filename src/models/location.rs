//! Location models: user queries, geocoding candidates and resolved places

use serde::{Deserialize, Serialize};
use std::fmt;

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components fall inside their valid ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Format as a coordinates string
    pub fn format(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// What the user asked for: a place name or a known position
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    /// Free text, `"City"` or `"City, State/Country"`
    Name(String),
    /// Position from device geolocation
    Coordinates(Coordinates),
}

impl LocationQuery {
    /// Parse raw input. Two comma or space separated numbers in range
    /// become coordinates, anything else is treated as a place name.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match Self::parse_coordinates(input) {
            Some(coords) => LocationQuery::Coordinates(coords),
            None => LocationQuery::Name(input.to_string()),
        }
    }

    fn parse_coordinates(input: &str) -> Option<Coordinates> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        if parts.len() != 2 {
            return None;
        }

        let lat = parts[0].parse::<f64>().ok()?;
        let lon = parts[1].parse::<f64>().ok()?;
        let coords = Coordinates::new(lat, lon);
        coords.is_valid().then_some(coords)
    }

    /// The leading city token of a name query: everything before the
    /// first comma, trimmed. `None` for coordinate queries.
    pub fn city_token(&self) -> Option<&str> {
        match self {
            LocationQuery::Name(text) => {
                Some(text.split(',').next().unwrap_or_default().trim())
            }
            LocationQuery::Coordinates(_) => None,
        }
    }

    /// A name query with nothing usable before the first comma
    pub fn is_empty(&self) -> bool {
        self.city_token().is_some_and(str::is_empty)
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::Name(text) => write!(f, "{text}"),
            LocationQuery::Coordinates(coords) => write!(f, "{}", coords.format()),
        }
    }
}

/// One place returned by forward or reverse geocoding
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GeoCandidate {
    /// Place name
    pub name: String,
    /// State or province, when the API knows one
    #[serde(default)]
    pub state: Option<String>,
    /// Country code (ISO 3166-1 alpha-2)
    #[serde(default)]
    pub country: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl GeoCandidate {
    /// `"Name, State"` when a state is present, else `"Name, Country"`
    pub fn display_name(&self) -> String {
        match self.state.as_deref().filter(|s| !s.is_empty()) {
            Some(state) => format!("{}, {}", self.name, state),
            None if self.country.is_empty() => self.name.clone(),
            None => format!("{}, {}", self.name, self.country),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// A single coordinate pair chosen for weather lookup
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Human-readable name; empty when reverse geocoding found nothing
    pub display_name: String,
}

impl ResolvedLocation {
    pub fn new(coordinates: Coordinates, display_name: String) -> Self {
        Self {
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            display_name,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

impl From<GeoCandidate> for ResolvedLocation {
    fn from(candidate: GeoCandidate) -> Self {
        let display_name = candidate.display_name();
        Self::new(candidate.coordinates(), display_name)
    }
}
