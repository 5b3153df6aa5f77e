//! Hybrid dispatch between remote extractors and the local responder
//!
//! Expense commands carry free-form item lists that the regex layer cannot
//! segment reliably, so that path is remote-only. Registration tries each
//! configured extractor in order and degrades to an aggregated error report.
//! Everything else stays local.

use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::backend::{parse, prompt, RemoteExtractor};
use crate::intent::{self, Intent};
use crate::responder::Responder;
use crate::result::{Action, ActionData, CommandResult, ProcessedBy};

/// Provider order also defines the fallback chain for registration.
const PROVIDERS: [&str; 2] = ["Groq", "Gemini"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreferredAi {
    #[default]
    Auto,
    Groq,
    Gemini,
    Local,
}

impl FromStr for PreferredAi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "groq" => Ok(Self::Groq),
            "gemini" => Ok(Self::Gemini),
            "local" => Ok(Self::Local),
            other => Err(format!(
                "modo desconhecido '{}' (use auto, groq, gemini ou local)",
                other
            )),
        }
    }
}

pub struct Dispatcher {
    backends: Vec<Box<dyn RemoteExtractor>>,
    responder: Responder,
}

impl Dispatcher {
    pub fn new(backends: Vec<Box<dyn RemoteExtractor>>, responder: Responder) -> Self {
        Self { backends, responder }
    }

    pub async fn process(&self, command: &str, preferred: PreferredAi) -> CommandResult {
        let classification = intent::classify(command);
        debug!(
            "Intent: {:?} (confidence {})",
            classification.intent, classification.confidence
        );

        if preferred == PreferredAi::Local {
            return self.responder.answer(command);
        }

        match classification.intent {
            Intent::AddExpense => self.process_expense(command, preferred).await,
            Intent::RegisterVehicle => self.process_registration(command, preferred).await,
            _ => self.responder.answer(command),
        }
    }

    /// Expense extraction has no local fallback; a missing backend is a
    /// capability error, not a degraded answer.
    async fn process_expense(&self, command: &str, preferred: PreferredAi) -> CommandResult {
        let backend = match self.select(preferred) {
            Some(b) => b,
            None => {
                return CommandResult::error(
                    "Nenhum extrator remoto configurado para processar gastos. \
                     Configure uma chave de API do Groq ou Gemini.",
                    0.0,
                );
            }
        };

        info!("Processing expense command via {}", backend.name());
        let raw = match backend.extract(&prompt::expense_prompt(command)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("{} expense extraction failed: {}", backend.name(), e);
                return CommandResult::error(
                    format!("{}: {}", backend.name(), e),
                    0.0,
                );
            }
        };

        match parse::parse_expenses(&raw) {
            Ok(batch) => CommandResult {
                action: Action::AddGastos,
                response: "Entendido! Processando gastos...".to_string(),
                data: Some(ActionData::Expenses(batch)),
                confidence: 0.9,
                processed_by: processed_by(backend.name()),
            },
            Err(e) => {
                warn!("{} returned unusable expense payload: {}", backend.name(), e);
                CommandResult::error(
                    "Não consegui identificar os gastos no comando.\n\n\
                     Tente: \"Placa ABC1234 câmbio r$ 200 documentação r$ 1000\"",
                    0.3,
                )
            }
        }
    }

    async fn process_registration(&self, command: &str, preferred: PreferredAi) -> CommandResult {
        let mut errors = Vec::new();

        for provider in self.chain(preferred) {
            let backend = match self.backends.iter().find(|b| b.name() == provider) {
                Some(b) => b,
                None => {
                    errors.push(format!("{}: não configurado", provider));
                    continue;
                }
            };

            info!("Processing registration via {}", provider);
            match backend.extract(&prompt::vehicle_prompt(command)).await {
                Ok(raw) => match parse::parse_vehicle(&raw) {
                    Ok(extracted) => {
                        return CommandResult {
                            action: Action::CreateVehicle,
                            response: format!(
                                "Entendido! Cadastrando {} {}...",
                                extracted.brand, extracted.model
                            ),
                            data: Some(ActionData::Vehicle(extracted)),
                            confidence: registration_confidence(provider),
                            processed_by: processed_by(provider),
                        };
                    }
                    Err(e) => errors.push(format!("{}: {}", provider, e)),
                },
                Err(e) => errors.push(format!("{}: {}", provider, e)),
            }
        }

        warn!("All remote extractors failed: {:?}", errors);
        CommandResult::error(
            format!(
                "Não foi possível processar o cadastro.\n\nDetalhes:\n{}",
                errors.join("\n")
            ),
            0.0,
        )
    }

    fn chain(&self, preferred: PreferredAi) -> Vec<&'static str> {
        match preferred {
            PreferredAi::Groq => vec!["Groq"],
            PreferredAi::Gemini => vec!["Gemini"],
            _ => PROVIDERS.to_vec(),
        }
    }

    fn select(&self, preferred: PreferredAi) -> Option<&dyn RemoteExtractor> {
        self.chain(preferred)
            .into_iter()
            .find_map(|p| self.backends.iter().find(|b| b.name() == p))
            .map(|b| b.as_ref())
    }
}

fn registration_confidence(provider: &str) -> f32 {
    match provider {
        "Groq" => 0.92,
        "Gemini" => 0.95,
        _ => 0.9,
    }
}

fn processed_by(provider: &str) -> ProcessedBy {
    match provider {
        "Groq" => ProcessedBy::Groq,
        "Gemini" => ProcessedBy::Gemini,
        _ => ProcessedBy::Local,
    }
}
