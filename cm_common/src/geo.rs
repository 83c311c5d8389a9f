use std::fmt::Display;

use serde::{Deserialize, Serialize};

//--------------------------------------      GeoPoint      ---------------------------------------------------------
/// A latitude/longitude pair, in decimal degrees.
///
/// Used both for live profile coordinates and for the location snapshot an order takes when it is
/// approved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}
