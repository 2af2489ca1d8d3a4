// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use bl_core::{find_nearby, validate_coordinates, DonationCenter, Hospital, Located, Nearby};

use crate::error::{Error, Result};
use crate::sync::{Transport, DONATION_CENTERS_KEY};

use super::Context;

/// A cached place that can be listed by distance.
pub trait Place: Located {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn city(&self) -> &str;
    fn phone(&self) -> Option<&str>;
}

impl Place for Hospital {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn city(&self) -> &str {
        &self.city
    }
    fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

impl Place for DonationCenter {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn city(&self) -> &str {
        &self.city
    }
    fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

/// Ranks cached hospitals by distance from `(lat, lon)`.
///
/// Radius and limit fall back to the `[nearby]` config section. Hospitals
/// without coordinates are reported at distance 0.
pub async fn run<T: Transport>(
    ctx: &Context<T>,
    lat: f64,
    lon: f64,
    radius_km: Option<f64>,
    limit: Option<usize>,
) -> Result<Vec<Nearby<Hospital>>> {
    let (radius_km, limit) = search_bounds(ctx, lat, lon, radius_km, limit)?;
    let hospitals = ctx.engine.cache().hospitals().await?;
    if hospitals.is_empty() {
        println!("No hospitals cached\n  hint: run 'bloodline pull hospitals' while online");
        return Ok(Vec::new());
    }
    Ok(print_ranked(hospitals, lat, lon, radius_km, limit))
}

/// Ranks cached, active donation centers by distance from `(lat, lon)`.
pub async fn run_centers<T: Transport>(
    ctx: &Context<T>,
    lat: f64,
    lon: f64,
    radius_km: Option<f64>,
    limit: Option<usize>,
) -> Result<Vec<Nearby<DonationCenter>>> {
    let (radius_km, limit) = search_bounds(ctx, lat, lon, radius_km, limit)?;
    let centers: Vec<DonationCenter> = ctx
        .engine
        .cache()
        .donation_centers()
        .await?
        .into_iter()
        .filter(|center| center.is_active)
        .collect();
    if centers.is_empty() {
        println!(
            "No donation centers cached\n  hint: run 'bloodline pull {}' while online",
            DONATION_CENTERS_KEY
        );
        return Ok(Vec::new());
    }
    Ok(print_ranked(centers, lat, lon, radius_km, limit))
}

fn search_bounds<T: Transport>(
    ctx: &Context<T>,
    lat: f64,
    lon: f64,
    radius_km: Option<f64>,
    limit: Option<usize>,
) -> Result<(f64, usize)> {
    validate_coordinates(lat, lon)?;
    let radius_km = radius_km.unwrap_or(ctx.config.nearby.radius_km);
    if !(radius_km.is_finite() && radius_km > 0.0) {
        return Err(Error::InvalidArgument {
            field: "radius",
            reason: format!("{} is not a positive distance", radius_km),
        });
    }
    Ok((radius_km, limit.unwrap_or(ctx.config.nearby.limit)))
}

fn print_ranked<P: Place>(
    places: Vec<P>,
    lat: f64,
    lon: f64,
    radius_km: f64,
    limit: usize,
) -> Vec<Nearby<P>> {
    let ranked = find_nearby(places, lat, lon, radius_km, limit);
    if ranked.is_empty() {
        println!("No results within {} km", radius_km);
    }
    for entry in &ranked {
        println!("{}", format_entry(entry));
    }
    ranked
}

fn format_entry<P: Place>(entry: &Nearby<P>) -> String {
    let place = &entry.item;
    let distance = match place.coordinates() {
        (Some(_), Some(_)) => format!("{:>6.1} km", entry.distance),
        _ => "     ? km".to_string(),
    };
    let name = if place.name().is_empty() {
        place.id()
    } else {
        place.name()
    };
    let mut line = format!("{}  {}", distance, name);
    if !place.city().is_empty() {
        line.push_str(&format!(" ({})", place.city()));
    }
    if let Some(phone) = place.phone() {
        line.push_str(&format!("  {}", phone));
    }
    line
}

#[cfg(test)]
#[path = "nearby_tests.rs"]
mod tests;
