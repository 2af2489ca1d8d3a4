// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Great-circle distance and nearby-center ranking.

use crate::error::{Error, Result};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Anything with (possibly missing) coordinates.
pub trait Located {
    /// Returns `(latitude, longitude)` in degrees.
    fn coordinates(&self) -> (Option<f64>, Option<f64>);
}

/// An item annotated with its distance from the query point.
#[derive(Debug, Clone, PartialEq)]
pub struct Nearby<T> {
    pub item: T,
    /// Kilometres, rounded to one decimal place.
    pub distance: f64,
}

/// Haversine distance in kilometres, rounded to one decimal place.
///
/// Returns `0.0` when any coordinate is missing so callers always get a
/// renderable value.
pub fn haversine_km(
    lat1: Option<f64>,
    lon1: Option<f64>,
    lat2: Option<f64>,
    lon2: Option<f64>,
) -> f64 {
    let (Some(lat1), Some(lon1), Some(lat2), Some(lon2)) = (lat1, lon1, lat2, lon2) else {
        return 0.0;
    };

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_one_decimal(EARTH_RADIUS_KM * c)
}

/// Checks that a query point lies on the globe.
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(Error::InvalidCoordinate(format!(
            "latitude {} is outside -90..=90",
            lat
        )));
    }
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(Error::InvalidCoordinate(format!(
            "longitude {} is outside -180..=180",
            lon
        )));
    }
    Ok(())
}

fn round_one_decimal(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

/// Annotates every item with its distance from `(lat, lon)` and ranks them.
///
/// See [`rank_nearby`] for the filtering rules.
pub fn find_nearby<T: Located>(
    items: impl IntoIterator<Item = T>,
    lat: f64,
    lon: f64,
    radius_km: f64,
    limit: usize,
) -> Vec<Nearby<T>> {
    let annotated = items
        .into_iter()
        .map(|item| {
            let (item_lat, item_lon) = item.coordinates();
            let distance = haversine_km(Some(lat), Some(lon), item_lat, item_lon);
            Nearby { item, distance }
        })
        .collect();
    rank_nearby(annotated, radius_km, limit)
}

/// Keeps items within `radius_km`, sorted nearest first, at most `limit`.
///
/// The sort is stable: items at equal distance keep their input order.
pub fn rank_nearby<T>(mut annotated: Vec<Nearby<T>>, radius_km: f64, limit: usize) -> Vec<Nearby<T>> {
    annotated.retain(|n| n.distance <= radius_km);
    annotated.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    annotated.truncate(limit);
    annotated
}

#[cfg(test)]
#[path = "geo_tests.rs"]
mod tests;
