//! Remote response parsing and validation
//!
//! Completions arrive as free text that usually, but not always, contains
//! the JSON we asked for. Cleanup strips markdown fences and isolates the
//! outermost brace block before anything is deserialized; missing required
//! keys are extraction failures, never panics.

use serde::Deserialize;

use crate::error::{MagnoError, MagnoResult};
use crate::extract::expense::{self, ExpenseBatch, ExtractedExpense, VehicleRef};
use crate::extract::vehicle::{normalize_plate, ExtractedVehicle};

/// Isolate the JSON object inside a raw completion
pub fn clean_json(raw: &str) -> MagnoResult<String> {
    let text = raw.replace("```json", "").replace("```", "");
    let start = text
        .find('{')
        .ok_or_else(|| MagnoError::Extraction("no JSON object in response".to_string()))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| MagnoError::Extraction("unterminated JSON object in response".to_string()))?;
    if end < start {
        return Err(MagnoError::Extraction("malformed JSON object in response".to_string()));
    }
    Ok(text[start..=end].to_string())
}

#[derive(Debug, Deserialize)]
struct RemoteVehicle {
    marca: Option<String>,
    modelo: Option<String>,
    #[serde(default)]
    ano: Option<i32>,
    #[serde(default)]
    cor: Option<String>,
    #[serde(default)]
    placa: Option<String>,
    #[serde(default)]
    km: Option<i64>,
    #[serde(default)]
    preco_compra: Option<f64>,
}

/// Parse a vehicle extraction response; brand and model are required
pub fn parse_vehicle(raw: &str) -> MagnoResult<ExtractedVehicle> {
    let json = clean_json(raw)?;
    let remote: RemoteVehicle = serde_json::from_str(&json)?;

    let brand = remote
        .marca
        .filter(|s| !s.is_empty())
        .ok_or_else(|| MagnoError::Extraction("response missing required key 'marca'".to_string()))?;
    let model = remote
        .modelo
        .filter(|s| !s.is_empty())
        .ok_or_else(|| MagnoError::Extraction("response missing required key 'modelo'".to_string()))?;

    Ok(ExtractedVehicle {
        brand,
        model,
        year: remote.ano,
        color: remote.cor,
        plate: remote.placa.map(|p| normalize_plate(&p)),
        mileage: remote.km,
        purchase_price: remote.preco_compra,
    })
}

#[derive(Debug, Deserialize)]
struct RemoteExpenseLine {
    tipo: String,
    valor: f64,
}

#[derive(Debug, Deserialize)]
struct RemoteExpenses {
    #[serde(default)]
    modelo: Option<String>,
    #[serde(default)]
    placa: Option<String>,
    gastos: Vec<RemoteExpenseLine>,
}

/// Parse an expense extraction response; at least one positive line required
pub fn parse_expenses(raw: &str) -> MagnoResult<ExpenseBatch> {
    let json = clean_json(raw)?;
    let remote: RemoteExpenses = serde_json::from_str(&json)?;

    let lines: Vec<ExtractedExpense> = remote
        .gastos
        .into_iter()
        .filter(|g| g.valor > 0.0 && !g.tipo.is_empty())
        .map(|g| ExtractedExpense {
            expense_type: capitalize(&g.tipo),
            amount: g.valor,
        })
        .collect();
    let lines = expense::dedup(lines);

    if lines.is_empty() {
        return Err(MagnoError::Extraction("response contained no expenses".to_string()));
    }

    let vehicle_ref = match (remote.placa, remote.modelo) {
        (Some(p), _) if !p.is_empty() => VehicleRef::Plate(normalize_plate(&p)),
        (_, Some(m)) if !m.is_empty() => VehicleRef::ModelHint(m),
        _ => VehicleRef::Unknown,
    };

    Ok(ExpenseBatch {
        expenses: lines,
        vehicle_ref,
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
