//! Vehicle resolution against the record store
//!
//! Spoken plates arrive with dropped dashes, inserted spaces and the odd
//! substituted character, so resolution is positional-similarity based
//! rather than exact. Plates are fixed-width codes: a transcription error is
//! far more often a same-position substitution than an insertion, which is
//! why this is not an edit-distance comparison.

use tracing::debug;

use crate::extract::vehicle::normalize_plate;
use crate::store::VehicleRecord;

/// Minimum plate similarity accepted; tolerant because voice transcription
/// frequently mangles one or two characters of an alphanumeric code
const PLATE_THRESHOLD: f64 = 0.6;

/// Model names are free text with higher collision risk than plates,
/// so the acceptance bar is stricter
const MODEL_THRESHOLD: f64 = 70.0;

/// Positional similarity between two normalized plates, in [0, 1]
pub fn plate_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 0.0;
    }
    let matches = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
    matches as f64 / max_len as f64
}

/// Resolve a spoken plate against stored vehicles
///
/// Exact match wins immediately; otherwise the highest positional score is
/// accepted at >= 0.6, else the vehicle is reported as not found.
pub fn find_by_plate<'a>(
    candidate: &str,
    vehicles: &'a [VehicleRecord],
) -> Option<&'a VehicleRecord> {
    let wanted = normalize_plate(candidate);

    if let Some(exact) = vehicles.iter().find(|v| {
        v.plate
            .as_deref()
            .map(|p| normalize_plate(p) == wanted)
            .unwrap_or(false)
    }) {
        return Some(exact);
    }

    let mut best: Option<(&VehicleRecord, f64)> = None;
    for vehicle in vehicles {
        let Some(stored) = vehicle.plate.as_deref() else {
            continue;
        };
        let score = plate_similarity(&normalize_plate(stored), &wanted);
        debug!("Plate compare '{}' vs '{}': {:.2}", wanted, stored, score);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((vehicle, score));
        }
    }

    match best {
        Some((vehicle, score)) if score >= PLATE_THRESHOLD => {
            debug!(
                "Plate resolved to {} {} at {:.0}%",
                vehicle.brand,
                vehicle.model,
                score * 100.0
            );
            Some(vehicle)
        }
        _ => None,
    }
}

/// Similarity score between model names, in [0, 100]
pub fn model_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a == b {
        return 100.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 80.0;
    }

    // Near-length names ("Golf" vs "Gol5") fall back to positional overlap
    let ca: Vec<char> = a.chars().collect();
    let cb: Vec<char> = b.chars().collect();
    if ca.len().abs_diff(cb.len()) <= 2 {
        let matches = ca.iter().zip(cb.iter()).filter(|(x, y)| x == y).count();
        return matches as f64 / ca.len().max(cb.len()) as f64 * 100.0;
    }

    0.0
}

/// Resolve a model hint when no plate was spoken
pub fn find_by_model<'a>(
    candidate: &str,
    vehicles: &'a [VehicleRecord],
) -> Option<&'a VehicleRecord> {
    let mut best: Option<(&VehicleRecord, f64)> = None;
    for vehicle in vehicles {
        let score = model_similarity(&vehicle.model, candidate);
        debug!(
            "Model compare '{}' vs '{}': {:.0}",
            candidate, vehicle.model, score
        );
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((vehicle, score));
        }
    }

    match best {
        Some((vehicle, score)) if score >= MODEL_THRESHOLD => Some(vehicle),
        _ => None,
    }
}
