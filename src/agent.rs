//! Top-level command orchestrator
//!
//! One entry point per spoken command: normalize, dispatch, apply the
//! resulting action against the record store, record an audit row. Store
//! failures are folded into the returned result; nothing here panics at a
//! caller.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::Normalizer;
use crate::dispatcher::{Dispatcher, PreferredAi};
use crate::error::MagnoResult;
use crate::extract::expense::{ExpenseBatch, VehicleRef};
use crate::extract::money::format_brl;
use crate::extract::vehicle::ExtractedVehicle;
use crate::matcher;
use crate::result::{Action, ActionData, CommandResult};
use crate::store::{LogEntry, NewVehicle, RecordStore, VehicleRecord};

/// Per-request settings carried alongside the transcript
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub session_id: String,
    pub preferred: PreferredAi,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            session_id: "default".to_string(),
            preferred: PreferredAi::Auto,
        }
    }
}

pub struct Agent {
    store: Arc<dyn RecordStore>,
    dispatcher: Dispatcher,
    normalizer: Normalizer,
}

impl Agent {
    pub fn new(store: Arc<dyn RecordStore>, dispatcher: Dispatcher, normalizer: Normalizer) -> Self {
        Self {
            store,
            dispatcher,
            normalizer,
        }
    }

    /// Process one spoken command end to end
    pub async fn process_voice_command(
        &self,
        transcript: &str,
        ctx: &RequestContext,
    ) -> CommandResult {
        if transcript.trim().is_empty() {
            return CommandResult::error("Nenhum comando reconhecido. Tente novamente.", 0.0);
        }

        let normalized = self.normalizer.normalize(transcript);
        info!("Processing command: '{}'", normalized);

        let interpreted = self.dispatcher.process(&normalized, ctx.preferred).await;
        let result = self.apply(interpreted);

        let log = LogEntry {
            session_id: ctx.session_id.clone(),
            command: normalized,
            response: result.response.clone(),
            ai_used: format!("{:?}", result.processed_by).to_lowercase(),
            confidence: result.confidence,
        };
        if let Err(e) = self.store.append_log(&log) {
            warn!("Failed to append agent log: {}", e);
        }

        result
    }

    /// Execute the side effect an interpreted result asks for. The returned
    /// result only keeps a mutating action if the mutation actually landed.
    fn apply(&self, result: CommandResult) -> CommandResult {
        match (result.action, result.data.clone()) {
            (Action::CreateVehicle, Some(ActionData::Vehicle(vehicle))) => {
                match self.create_vehicle(&vehicle) {
                    Ok(created) => CommandResult {
                        response: format!(
                            "Veículo {} {} {} cadastrado com sucesso!",
                            created.brand,
                            created.model,
                            created.year.map(|y| y.to_string()).unwrap_or_default()
                        ),
                        ..result
                    },
                    Err(e) => {
                        error!("Vehicle insert failed: {}", e);
                        CommandResult::error(
                            format!("Erro ao salvar o veículo: {}", e),
                            0.0,
                        )
                    }
                }
            }
            (Action::AddGastos, Some(ActionData::Expenses(batch))) => {
                self.add_expenses(&batch, result)
            }
            _ => result,
        }
    }

    fn create_vehicle(&self, extracted: &ExtractedVehicle) -> MagnoResult<VehicleRecord> {
        let now = chrono::Local::now();
        self.store.create_vehicle(NewVehicle {
            brand: extracted.brand.clone(),
            model: extracted.model.clone(),
            year: extracted.year.unwrap_or_else(|| {
                use chrono::Datelike;
                now.year()
            }),
            color: extracted.color.clone(),
            plate: extracted.plate.clone(),
            mileage: extracted.mileage,
            purchase_price: extracted.purchase_price.unwrap_or(0.0),
            purchase_date: now.format("%Y-%m-%d").to_string(),
            notes: Some("Cadastrado por comando de voz".to_string()),
        })
    }

    fn add_expenses(&self, batch: &ExpenseBatch, result: CommandResult) -> CommandResult {
        let vehicles = match self.store.list_vehicles() {
            Ok(v) => v,
            Err(e) => {
                error!("Vehicle listing failed: {}", e);
                return CommandResult::error(format!("Erro ao consultar veículos: {}", e), 0.0);
            }
        };

        let target = match &batch.vehicle_ref {
            VehicleRef::Plate(plate) => matcher::find_by_plate(plate, &vehicles),
            VehicleRef::ModelHint(hint) => matcher::find_by_model(hint, &vehicles),
            VehicleRef::Unknown => None,
        };

        let Some(vehicle) = target else {
            return CommandResult::error(not_found_message(&batch.vehicle_ref, &vehicles), 0.3);
        };

        match self.store.create_expenses(vehicle.id, &batch.expenses) {
            Ok(created) => {
                let lines = created
                    .iter()
                    .map(|e| format!("- {}: R$ {}", e.expense_type, format_brl(e.amount)))
                    .collect::<Vec<_>>()
                    .join("\n");
                let total: f64 = created.iter().map(|e| e.amount).sum();
                CommandResult {
                    response: format!(
                        "{} gasto(s) adicionado(s) ao {} {}:\n{}\nTotal: R$ {}",
                        created.len(),
                        vehicle.brand,
                        vehicle.model,
                        lines,
                        format_brl(total)
                    ),
                    ..result
                }
            }
            Err(e) => {
                error!("Expense insert failed: {}", e);
                CommandResult::error(format!("Erro ao salvar os gastos: {}", e), 0.0)
            }
        }
    }
}

fn not_found_message(vehicle_ref: &VehicleRef, vehicles: &[VehicleRecord]) -> String {
    let wanted = match vehicle_ref {
        VehicleRef::Plate(p) => format!("com a placa {}", p),
        VehicleRef::ModelHint(m) => format!("parecido com \"{}\"", m),
        VehicleRef::Unknown => "mencionado".to_string(),
    };
    if vehicles.is_empty() {
        return format!(
            "Não encontrei o veículo {}. Nenhum veículo cadastrado ainda.",
            wanted
        );
    }
    let listing = vehicles
        .iter()
        .map(|v| {
            format!(
                "- {} {} ({})",
                v.brand,
                v.model,
                v.plate.as_deref().unwrap_or("sem placa")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Não encontrei o veículo {}. Veículos disponíveis:\n{}",
        wanted, listing
    )
}
