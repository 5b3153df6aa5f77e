//! Expense batch extraction
//!
//! Turns "placa ABC1234 câmbio r$ 200 documentação r$ 1000" into an ordered,
//! deduplicated batch of typed expense lines. Three surface syntaxes are
//! attempted in order; the first one that yields anything wins. Any plate
//! reference is stripped from the working text before the amount patterns
//! run, so plate digits are never misread as money.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::money;
use crate::extract::vehicle;

/// Mechanical and paperwork vocabulary that marks a command as expense-domain
pub const EXPENSE_KEYWORDS: &[&str] = &[
    "câmbio",
    "cambio",
    "motor",
    "pneu",
    "freio",
    "suspensão",
    "suspensao",
    "embreagem",
    "bateria",
    "óleo",
    "oleo",
    "revisão",
    "revisao",
    "funilaria",
    "pintura",
    "documentação",
    "documentacao",
    "manutenção",
    "manutencao",
    "peça",
    "peca",
    "serviço",
    "servico",
    "mecânico",
    "mecanico",
    "lataria",
    "farol",
    "escapamento",
];

/// Words that can never be an expense type on their own
const STOPWORDS: &[&str] = &[
    "placa",
    "adicionar",
    "registrar",
    "cadastrar",
    "gastei",
    "gastou",
    "gasto",
    "gastos",
    "paguei",
    "pagou",
    "comprei",
    "comprou",
    "reais",
    "real",
    "valor",
    "carro",
    "veículo",
    "veiculo",
    "para",
    "com",
    "por",
    "uma",
    "das",
    "dos",
    "de",
    "do",
    "da",
    "em",
    "no",
    "na",
    "ok",
    "e",
];

lazy_static! {
    // Syntax 1: <type> r$ <amount>, anchored on the explicit currency marker
    static ref TYPE_CURRENCY: Regex =
        Regex::new(r"(?i)([a-zà-ú]{2,})\s*r\$\s*([\d.,]+)(\s*mil)?").expect("currency regex");
    // Syntax 2: <type> <amount> with a bare 2-5 digit integer
    static ref TYPE_BARE: Regex =
        Regex::new(r"(?i)([a-zà-ú]{2,})\s+(\d{2,5})\b").expect("bare amount regex");
    // Syntax 3: <amount> em|para|no|na <type>
    static ref AMOUNT_PREP: Regex =
        Regex::new(r"(?i)([\d.,]+)\s*(?:reais\s+)?(?:em|para|no|na)\s+([a-zà-ú]{2,})")
            .expect("reversed regex");
    static ref PLATE_REF: Regex =
        Regex::new(r"(?i)\bplaca\s*[a-z]{3}[\s-]?(?:\d[a-z]\d{2}|\d{4})\b").expect("plate ref");
    static ref BARE_PLATE: Regex =
        Regex::new(r"(?i)\b[a-z]{3}[\s-]?(?:\d[a-z]\d{2}|\d{4})\b").expect("bare plate");
}

/// One expense line; `amount` is always positive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedExpense {
    #[serde(rename = "tipo")]
    pub expense_type: String,
    #[serde(rename = "valor")]
    pub amount: f64,
}

/// How the batch points back at a vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleRef {
    Plate(String),
    ModelHint(String),
    Unknown,
}

/// An ordered set of expenses plus the vehicle they belong to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseBatch {
    pub expenses: Vec<ExtractedExpense>,
    pub vehicle_ref: VehicleRef,
}

impl ExpenseBatch {
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }
}

/// Extract an expense batch from a transcript
///
/// `plate_ref` carries a plate already resolved by the caller; when absent
/// the transcript itself is scanned for one before it gets stripped.
pub fn extract_expenses(transcript: &str, plate_ref: Option<&str>) -> ExpenseBatch {
    let cmd = transcript.to_lowercase();

    let vehicle_ref = match plate_ref {
        Some(p) => VehicleRef::Plate(vehicle::normalize_plate(p)),
        None => match vehicle::extract_plate(&cmd) {
            Some(p) => VehicleRef::Plate(p),
            None => model_hint(&cmd),
        },
    };

    // Plate digits must never be read as an amount
    let working = BARE_PLATE
        .replace_all(&PLATE_REF.replace_all(&cmd, " "), " ")
        .into_owned();

    let expenses = parse_type_currency(&working)
        .or_else(|| parse_type_bare(&working))
        .or_else(|| parse_amount_prep(&working))
        .unwrap_or_default();

    let deduped = dedup(expenses);
    debug!("Extracted {} expense line(s)", deduped.len());

    ExpenseBatch {
        expenses: deduped,
        vehicle_ref,
    }
}

fn parse_type_currency(text: &str) -> Option<Vec<ExtractedExpense>> {
    let mut out = Vec::new();
    for caps in TYPE_CURRENCY.captures_iter(text) {
        let kind = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if is_stopword(kind) {
            continue;
        }
        let Some(mut amount) = caps.get(2).and_then(|m| money::parse_plain(m.as_str())) else {
            continue;
        };
        if caps.get(3).is_some() {
            amount *= 1000.0;
        }
        out.push(ExtractedExpense {
            expense_type: display_type(kind),
            amount,
        });
    }
    non_empty(out)
}

fn parse_type_bare(text: &str) -> Option<Vec<ExtractedExpense>> {
    let mut out = Vec::new();
    for caps in TYPE_BARE.captures_iter(text) {
        let kind = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if is_stopword(kind) {
            continue;
        }
        let Some(amount) = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok()) else {
            continue;
        };
        if !(10.0..=99999.0).contains(&amount) {
            continue;
        }
        out.push(ExtractedExpense {
            expense_type: display_type(kind),
            amount,
        });
    }
    non_empty(out)
}

fn parse_amount_prep(text: &str) -> Option<Vec<ExtractedExpense>> {
    let mut out = Vec::new();
    for caps in AMOUNT_PREP.captures_iter(text) {
        let kind = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        if is_stopword(kind) {
            continue;
        }
        let Some(amount) = caps.get(1).and_then(|m| money::parse_plain(m.as_str())) else {
            continue;
        };
        out.push(ExtractedExpense {
            expense_type: display_type(kind),
            amount,
        });
    }
    non_empty(out)
}

/// Case-insensitive dedup by type; first occurrence wins
pub fn dedup(expenses: Vec<ExtractedExpense>) -> Vec<ExtractedExpense> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for expense in expenses {
        let key = expense.expense_type.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(expense);
    }
    out
}

fn model_hint(cmd: &str) -> VehicleRef {
    // "gastei 80 em peça no civic" style reference, only when no plate exists
    lazy_static! {
        static ref HINT: Regex =
            Regex::new(r"(?i)\b(?:no|na|do|da)\s+([a-zà-ú]{3,})\b").expect("hint regex");
    }
    for caps in HINT.captures_iter(cmd) {
        if let Some(word) = caps.get(1) {
            let word = word.as_str();
            if !is_stopword(word) && !EXPENSE_KEYWORDS.contains(&word) {
                return VehicleRef::ModelHint(word.to_string());
            }
        }
    }
    VehicleRef::Unknown
}

fn is_stopword(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOPWORDS.contains(&lower.as_str())
}

fn display_type(kind: &str) -> String {
    let lower = kind.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// True when the text carries any expense-domain signal: part vocabulary,
/// a currency marker, or a money-looking amount
pub fn has_expense_signal(text: &str) -> bool {
    let lower = text.to_lowercase();
    if lower.contains("r$") {
        return true;
    }
    if EXPENSE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return true;
    }
    AMOUNT_PREP.is_match(&lower)
}

fn non_empty(v: Vec<ExtractedExpense>) -> Option<Vec<ExtractedExpense>> {
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}
