//! Vehicle entity extraction
//!
//! Pulls typed vehicle fields out of a raw Portuguese transcript. Each field
//! is extracted independently through an ordered list of regex alternatives,
//! most specific first; a missing year never blocks the plate, and so on.
//! The extractor only succeeds when brand and model are both present.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::money;
use crate::utils::fuzzy;

/// Brands the extractor recognizes without an explicit "marca" marker
pub const KNOWN_BRANDS: &[&str] = &[
    "honda",
    "toyota",
    "fiat",
    "volkswagen",
    "vw",
    "chevrolet",
    "ford",
    "hyundai",
    "nissan",
    "renault",
    "peugeot",
    "citroen",
    "jeep",
    "bmw",
    "mercedes",
    "audi",
    "kia",
    "mitsubishi",
    "suzuki",
    "mazda",
    "volvo",
];

const COLORS: &[&str] = &[
    "preto", "preta", "branco", "branca", "prata", "cinza", "vermelho", "vermelha", "azul",
    "verde", "amarelo", "amarela", "dourado", "marrom",
];

lazy_static! {
    static ref BRAND_MARKER: Regex = Regex::new(r"(?i)marca\s+([\wà-ú]+)").expect("brand regex");
    static ref MODEL_MARKER: Regex = Regex::new(r"(?i)modelo\s+([\wà-ú]+)").expect("model regex");
    static ref YEAR: Regex = Regex::new(r"\b(19|20)\d{2}\b").expect("year regex");
    // Old format ABC1234 and Mercosul ABC1D23, optional separator
    static ref PLATE: Regex =
        Regex::new(r"(?i)\b([a-z]{3})[\s-]?(\d[a-z]\d{2}|\d{4})\b").expect("plate regex");
    static ref KM_MARKER: Regex =
        Regex::new(r"(?i)(?:quilometragem|km)\s*(?:de\s*)?([\d.]+)").expect("km regex");
    static ref KM_MIL: Regex = Regex::new(r"(?i)\b([\d.]+)\s*mil\s*km\b").expect("km mil regex");
    static ref KM_K: Regex = Regex::new(r"(?i)\b(\d+)\s*k\s*km\b").expect("km k regex");
    static ref KM_SUFFIX: Regex = Regex::new(r"(?i)\b([\d.]+)\s*km\b").expect("km suffix regex");
    static ref PRICE_MARKER: Regex = Regex::new(
        r"(?i)(?:por|preço|preco|valor|comprei|paguei|custou)\s*(?:de|por|em|a)?\s*(?:r\$)?\s*([\d.,]+)\s*(mil|k)?\b"
    )
    .expect("price regex");
    static ref BIG_NUMBER: Regex = Regex::new(r"\b(\d{5,})\b").expect("big number regex");
}

/// Vehicle fields extracted from one transcript
///
/// Brand and model are mandatory by construction; everything else stays
/// explicitly optional until business defaults apply at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedVehicle {
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub plate: Option<String>,
    pub mileage: Option<i64>,
    pub purchase_price: Option<f64>,
}

/// Extract a vehicle from a transcript, or None when brand/model are missing
pub fn extract_vehicle(transcript: &str) -> Option<ExtractedVehicle> {
    let cmd = transcript.to_lowercase();

    let (brand, surface) = extract_brand(&cmd)?;
    let model = extract_model(&cmd, &surface)?;

    let vehicle = ExtractedVehicle {
        brand,
        model,
        year: extract_year(&cmd),
        color: extract_color(&cmd),
        plate: extract_plate(&cmd),
        mileage: extract_mileage(&cmd),
        purchase_price: extract_price(&cmd),
    };
    debug!("Extracted vehicle: {:?}", vehicle);
    Some(vehicle)
}

/// Returns the canonical brand plus the surface token that matched it,
/// so positional model extraction can anchor on what was actually said
fn extract_brand(cmd: &str) -> Option<(String, String)> {
    // 1. Explicit "marca X" marker
    if let Some(caps) = BRAND_MARKER.captures(cmd) {
        let token = caps.get(1).map(|m| m.as_str())?;
        if let Some(found) = fuzzy::find_best_match(token, KNOWN_BRANDS, 0.8) {
            return Some((canonical_brand(&found.value), token.to_string()));
        }
    }

    // 2. Known brand mentioned anywhere
    for brand in KNOWN_BRANDS {
        if cmd.contains(brand) {
            return Some((canonical_brand(brand), brand.to_string()));
        }
    }

    // 3. Fuzzy token scan for transcription noise ("ronda" -> "honda")
    for token in cmd.split_whitespace() {
        if token.len() >= 3 {
            if let Some(found) = fuzzy::find_best_match(token, KNOWN_BRANDS, 0.8) {
                debug!("Fuzzy brand match '{}' -> '{}'", token, found.value);
                return Some((canonical_brand(&found.value), token.to_string()));
            }
        }
    }

    None
}

fn canonical_brand(brand: &str) -> String {
    if brand.eq_ignore_ascii_case("vw") {
        return "Volkswagen".to_string();
    }
    capitalize(brand)
}

fn extract_model(cmd: &str, brand_token: &str) -> Option<String> {
    // 1. Explicit "modelo X" marker beats positional guessing
    if let Some(caps) = MODEL_MARKER.captures(cmd) {
        return caps.get(1).map(|m| capitalize(m.as_str()));
    }

    // 2. First word after the brand mention
    let after = Regex::new(&format!(r"{}\s+([\wà-ú]+)", regex::escape(brand_token))).ok()?;
    let caps = after.captures(cmd)?;
    let word = caps.get(1)?.as_str();

    // A year or plate right after the brand is not a model name
    if YEAR.is_match(word) || word.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(capitalize(word))
}

fn extract_year(cmd: &str) -> Option<i32> {
    YEAR.find(cmd).and_then(|m| m.as_str().parse().ok())
}

fn extract_color(cmd: &str) -> Option<String> {
    for color in COLORS {
        let word = Regex::new(&format!(r"\b{}\b", color)).ok()?;
        if word.is_match(cmd) {
            return Some(capitalize(color));
        }
    }
    None
}

/// Extract and normalize a plate reference: strip separators, uppercase
pub fn extract_plate(text: &str) -> Option<String> {
    let caps = PLATE.captures(text)?;
    let letters = caps.get(1)?.as_str();
    let digits = caps.get(2)?.as_str();
    Some(format!("{}{}", letters, digits).to_uppercase())
}

/// Normalize a stored or spoken plate for comparison
pub fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

fn extract_mileage(cmd: &str) -> Option<i64> {
    if let Some(caps) = KM_MIL.captures(cmd) {
        let v = money::parse_plain(caps.get(1)?.as_str())?;
        return Some((v * 1000.0) as i64);
    }
    if let Some(caps) = KM_K.captures(cmd) {
        let v: i64 = caps.get(1)?.as_str().parse().ok()?;
        return Some(v * 1000);
    }
    if let Some(caps) = KM_MARKER.captures(cmd) {
        let v = money::parse_plain(caps.get(1)?.as_str())?;
        return Some(v as i64);
    }
    if let Some(caps) = KM_SUFFIX.captures(cmd) {
        let v = money::parse_plain(caps.get(1)?.as_str())?;
        return Some(v as i64);
    }
    None
}

fn extract_price(cmd: &str) -> Option<f64> {
    if let Some(caps) = PRICE_MARKER.captures(cmd) {
        let mut value = money::parse_plain(caps.get(1)?.as_str())?;
        if caps.get(2).is_some() {
            value *= 1000.0;
        }
        return Some(value);
    }
    // Bare large number with no marker at all
    BIG_NUMBER
        .captures(cmd)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_registration_phrase() {
        let v = extract_vehicle("cadastrar honda civic 2020 preto por 50000").unwrap();
        assert_eq!(v.brand, "Honda");
        assert_eq!(v.model, "Civic");
        assert_eq!(v.year, Some(2020));
        assert_eq!(v.color, Some("Preto".to_string()));
        assert_eq!(v.purchase_price, Some(50000.0));
    }

    #[test]
    fn test_marker_forms() {
        let v = extract_vehicle("marca volkswagen modelo gol ano 2018 cor prata").unwrap();
        assert_eq!(v.brand, "Volkswagen");
        assert_eq!(v.model, "Gol");
        assert_eq!(v.year, Some(2018));
        assert_eq!(v.color, Some("Prata".to_string()));
    }

    #[test]
    fn test_vw_alias() {
        let v = extract_vehicle("cadastrar vw gol 2015").unwrap();
        assert_eq!(v.brand, "Volkswagen");
        assert_eq!(v.model, "Gol");
    }

    #[test]
    fn test_missing_model_fails() {
        assert!(extract_vehicle("cadastrar honda 2020").is_none());
        assert!(extract_vehicle("cadastrar alguma coisa").is_none());
    }

    #[test]
    fn test_independent_fields() {
        // Missing year must not block plate extraction
        let v = extract_vehicle("fiat uno placa abc1234 branco").unwrap();
        assert_eq!(v.year, None);
        assert_eq!(v.plate, Some("ABC1234".to_string()));
    }

    #[test]
    fn test_plate_formats() {
        assert_eq!(extract_plate("placa abc-1234"), Some("ABC1234".to_string()));
        assert_eq!(extract_plate("placa nld4460"), Some("NLD4460".to_string()));
        // Mercosul format
        assert_eq!(extract_plate("placa abc1d23"), Some("ABC1D23".to_string()));
        assert_eq!(extract_plate("sem placa aqui"), None);
    }

    #[test]
    fn test_mileage_forms() {
        let v = extract_vehicle("fiat uno 2015 quilometragem 80.000").unwrap();
        assert_eq!(v.mileage, Some(80000));

        let v = extract_vehicle("fiat uno 100 mil km").unwrap();
        assert_eq!(v.mileage, Some(100_000));
    }

    #[test]
    fn test_price_mil_shorthand() {
        let v = extract_vehicle("registrar toyota corolla 2022 prata por 80 mil").unwrap();
        assert_eq!(v.purchase_price, Some(80000.0));
    }

    #[test]
    fn test_fuzzy_brand() {
        let v = extract_vehicle("cadastrar ronda civic 2020").unwrap();
        assert_eq!(v.brand, "Honda");
    }
}
