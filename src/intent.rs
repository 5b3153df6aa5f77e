//! Intent classification
//!
//! Ordered keyword predicates over the raw transcript. The order is a
//! contract: expense detection runs strictly before registration detection,
//! because "placa ABC1234 câmbio r$200" also matches registration-adjacent
//! patterns and would otherwise be misrouted to vehicle creation. The weak
//! "marca ... modelo" pattern runs last and is unreachable once any expense
//! rule fired.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::extract::expense;
use crate::extract::vehicle;

/// Command domain resolved from a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    RegisterVehicle,
    AddExpense,
    Query,
    Navigate,
    Help,
    Unknown,
}

/// Classification outcome; confidence is fixed per rule, not computed
#[derive(Debug, Clone, Copy)]
pub struct Classification {
    pub intent: Intent,
    pub confidence: f32,
}

struct Rule {
    label: &'static str,
    check: fn(&str) -> bool,
    intent: Intent,
    confidence: f32,
}

lazy_static! {
    static ref EXPENSE_TRIGGER: Regex = Regex::new(
        r"(?i)gast(o|ei|ou)|despesa|pagou|pag(o|uei)|comprou|compra\b|serviço|servico|peça|peca|documentação|documentacao"
    )
    .expect("expense trigger regex");
    static ref REGISTER_TRIGGER: Regex = Regex::new(
        r"(?i)cadastr|adicionar|adiciona\b|registrar|registra\b|novo veículo|novo carro|criar veículo|cria veículo"
    )
    .expect("register trigger regex");
    static ref GENERIC_REGISTER: Regex =
        Regex::new(r"(?i)marca\s.*modelo\s").expect("generic register regex");
    static ref NAVIGATE_TRIGGER: Regex =
        Regex::new(r"(?i)\bir para\b|\babrir\b|\bnavegar\b|página|pagina").expect("navigate regex");
    static ref HELP_TRIGGER: Regex =
        Regex::new(r"(?i)\bajuda\b|\bhelp\b|\bcomandos\b").expect("help regex");
}

/// Ordered rule table; first hit wins
const RULES: &[Rule] = &[
    Rule {
        label: "expense trigger phrase",
        check: |t| EXPENSE_TRIGGER.is_match(t),
        intent: Intent::AddExpense,
        confidence: 0.95,
    },
    Rule {
        label: "plate plus expense keyword",
        check: |t| vehicle::extract_plate(t).is_some() && expense::has_expense_signal(t),
        intent: Intent::AddExpense,
        confidence: 0.9,
    },
    Rule {
        label: "registration trigger phrase",
        check: |t| REGISTER_TRIGGER.is_match(t),
        intent: Intent::RegisterVehicle,
        confidence: 0.95,
    },
    Rule {
        label: "generic marca/modelo pattern",
        // never fires in the presence of any expense signal; the pattern is
        // too weak to override part names or currency markers
        check: |t| GENERIC_REGISTER.is_match(t) && !expense::has_expense_signal(t),
        intent: Intent::RegisterVehicle,
        confidence: 0.3,
    },
    Rule {
        label: "navigation phrase",
        check: |t| NAVIGATE_TRIGGER.is_match(t),
        intent: Intent::Navigate,
        confidence: 0.9,
    },
    Rule {
        label: "help phrase",
        check: |t| HELP_TRIGGER.is_match(t),
        intent: Intent::Help,
        confidence: 0.9,
    },
];

/// Classify a transcript into a command domain
pub fn classify(transcript: &str) -> Classification {
    let text = transcript.to_lowercase();

    for rule in RULES {
        if (rule.check)(&text) {
            debug!("Intent rule matched: {}", rule.label);
            return Classification {
                intent: rule.intent,
                confidence: rule.confidence,
            };
        }
    }

    // Everything else belongs to the local responder
    Classification {
        intent: Intent::Query,
        confidence: 0.3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_beats_registration() {
        // Contains both a plate and registration-adjacent tokens
        let c = classify("placa ABC1234 câmbio r$200 marca honda modelo civic");
        assert_eq!(c.intent, Intent::AddExpense);
    }

    #[test]
    fn test_plate_with_part_keyword() {
        let c = classify("placa ABC1234 pneu 350");
        assert_eq!(c.intent, Intent::AddExpense);
        assert!(c.confidence >= 0.9);
    }

    #[test]
    fn test_registration_trigger() {
        let c = classify("cadastrar honda civic 2020 preto por 50000");
        assert_eq!(c.intent, Intent::RegisterVehicle);
        assert!(c.confidence >= 0.9);
    }

    #[test]
    fn test_generic_pattern_low_confidence() {
        let c = classify("marca honda modelo civic");
        assert_eq!(c.intent, Intent::RegisterVehicle);
        assert!(c.confidence <= 0.4);
    }

    #[test]
    fn test_generic_pattern_suppressed_by_expense_signal() {
        // currency marker without a plate: neither expense rule fires, but the
        // weak registration pattern must not claim it either
        let c = classify("marca honda modelo civic r$ 200");
        assert_eq!(c.intent, Intent::Query);
    }

    #[test]
    fn test_navigation() {
        assert_eq!(classify("ir para veículos").intent, Intent::Navigate);
        assert_eq!(classify("abrir dashboard").intent, Intent::Navigate);
    }

    #[test]
    fn test_help() {
        assert_eq!(classify("ajuda").intent, Intent::Help);
    }

    #[test]
    fn test_query_fallback() {
        let c = classify("quantos veículos tenho");
        assert_eq!(c.intent, Intent::Query);
        assert_eq!(c.confidence, 0.3);
    }
}
