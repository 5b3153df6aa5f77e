//! End-to-end interpreter tests
//!
//! Drive the agent through full command round trips against a temp sqlite
//! store, with remote extractors stubbed out by canned payloads.

use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;

use magno::agent::{Agent, RequestContext};
use magno::backend::RemoteExtractor;
use magno::core::Normalizer;
use magno::dispatcher::{Dispatcher, PreferredAi};
use magno::responder::Responder;
use magno::result::{Action, ProcessedBy};
use magno::store::{RecordStore, SqliteStore};

struct StubExtractor {
    name: &'static str,
    reply: Result<String, String>,
}

#[async_trait]
impl RemoteExtractor for StubExtractor {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn extract(&self, _prompt: &str) -> magno::error::MagnoResult<String> {
        self.reply
            .clone()
            .map_err(magno::error::MagnoError::Backend)
    }
}

fn agent_with(backends: Vec<Box<dyn RemoteExtractor>>) -> (TempDir, Agent) {
    let dir = TempDir::new().expect("temp dir");
    let store: Arc<dyn RecordStore> =
        Arc::new(SqliteStore::new(dir.path().join("test.db")).expect("store"));
    let dispatcher = Dispatcher::new(backends, Responder::new(Arc::clone(&store)));
    let agent = Agent::new(store, dispatcher, Normalizer::default());
    (dir, agent)
}

fn stub(name: &'static str, reply: Result<&str, &str>) -> Box<dyn RemoteExtractor> {
    Box::new(StubExtractor {
        name,
        reply: reply.map(str::to_string).map_err(str::to_string),
    })
}

fn ctx() -> RequestContext {
    RequestContext {
        session_id: "it".to_string(),
        preferred: PreferredAi::Auto,
    }
}

fn local_ctx() -> RequestContext {
    RequestContext {
        session_id: "it".to_string(),
        preferred: PreferredAi::Local,
    }
}

#[tokio::test]
async fn registration_round_trip_via_remote() {
    let (_dir, agent) = agent_with(vec![stub(
        "Groq",
        Ok(r#"```json
{"marca":"Honda","modelo":"Civic","ano":2020,"cor":"preto","placa":"abc-1234","km":45000,"preco_compra":50000}
```"#),
    )]);

    let result = agent
        .process_voice_command("Cadastrar Honda Civic 2020 preto placa ABC1234 45 mil km por 50 mil", &ctx())
        .await;
    assert_eq!(result.action, Action::CreateVehicle);
    assert_eq!(result.processed_by, ProcessedBy::Groq);
    assert_eq!(result.confidence, 0.92);
    assert!(result.response.contains("Honda Civic 2020"));

    let listing = agent
        .process_voice_command("listar todos os veículos", &local_ctx())
        .await;
    assert!(listing.response.contains("Honda Civic 2020"));
}

#[tokio::test]
async fn expense_round_trip_with_fuzzy_plate() {
    let (_dir, agent) = agent_with(vec![
        stub(
            "Groq",
            Ok(r#"{"marca":"Honda","modelo":"Civic","ano":2020,"placa":"ABC1234"}"#),
        ),
        stub(
            "Gemini",
            Ok(r#"{"placa":"ABC1235","gastos":[{"tipo":"câmbio","valor":200},{"tipo":"documentação","valor":1000}]}"#),
        ),
    ]);

    agent
        .process_voice_command("Cadastrar Honda Civic 2020 placa ABC1234", &ctx())
        .await;

    // groq stub only knows vehicle JSON, so force the expense payload source
    let result = agent
        .process_voice_command("placa ABC1235 câmbio r$ 200 documentação r$ 1000", &{
            RequestContext {
                session_id: "it".to_string(),
                preferred: PreferredAi::Gemini,
            }
        })
        .await;

    // one transcription error in seven characters still resolves
    assert_eq!(result.action, Action::AddGastos);
    assert!(result.response.contains("2 gasto(s) adicionado(s) ao Honda Civic"));
    assert!(result.response.contains("Total: R$ 1.200,00"));

    let total = agent
        .process_voice_command("quanto gastei no total com custos", &local_ctx())
        .await;
    assert!(total.response.contains("1.200,00"));
}

#[tokio::test]
async fn expense_duplicates_collapse_within_command() {
    let (_dir, agent) = agent_with(vec![stub(
        "Groq",
        Ok(r#"{"placa":"ABC1234","gastos":[{"tipo":"Pneu","valor":350},{"tipo":"pneu","valor":400}]}"#),
    )]);

    agent
        .process_voice_command(
            "cadastrar honda civic 2020 placa abc1234",
            &local_ctx(),
        )
        .await;

    let result = agent
        .process_voice_command("placa abc1234 pneu r$ 350 pneu r$ 400", &ctx())
        .await;
    assert_eq!(result.action, Action::AddGastos);
    // first occurrence wins, case-insensitively
    assert!(result.response.contains("1 gasto(s)"));
    assert!(result.response.contains("350,00"));
    assert!(!result.response.contains("400,00"));
}

#[tokio::test]
async fn expense_without_remote_backend_is_capability_error() {
    let (_dir, agent) = agent_with(vec![]);
    let result = agent
        .process_voice_command("placa ABC1234 câmbio r$ 200", &ctx())
        .await;
    assert_eq!(result.action, Action::Error);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.processed_by, ProcessedBy::None);
    assert!(result.response.contains("Nenhum extrator remoto"));
}

#[tokio::test]
async fn expense_for_unknown_vehicle_lists_inventory() {
    let (_dir, agent) = agent_with(vec![stub(
        "Groq",
        Ok(r#"{"placa":"XYZ9999","gastos":[{"tipo":"motor","valor":3000}]}"#),
    )]);

    agent
        .process_voice_command("cadastrar fiat uno 2015 placa abc1234", &local_ctx())
        .await;

    let result = agent
        .process_voice_command("placa xyz9999 motor r$ 3000", &ctx())
        .await;
    assert_eq!(result.action, Action::Error);
    assert!(result.response.contains("Não encontrei o veículo"));
    assert!(result.response.contains("Fiat Uno"));

    // nothing was written
    let total = agent
        .process_voice_command("quanto somam os custos", &local_ctx())
        .await;
    assert!(total.response.contains("0,00"));
}

#[tokio::test]
async fn queries_stay_local_even_with_backends_configured() {
    let (_dir, agent) = agent_with(vec![stub("Groq", Err("should not be called"))]);
    let result = agent
        .process_voice_command("quantos veículos tenho?", &ctx())
        .await;
    assert_eq!(result.action, Action::Success);
    assert_eq!(result.processed_by, ProcessedBy::Local);
}

#[tokio::test]
async fn registration_fallback_on_malformed_payload() {
    let (_dir, agent) = agent_with(vec![
        stub("Groq", Ok("desculpe, não entendi o comando")),
        stub("Gemini", Ok(r#"{"marca":"Fiat","modelo":"Uno","ano":2015}"#)),
    ]);
    let result = agent
        .process_voice_command("cadastrar fiat uno 2015", &ctx())
        .await;
    assert_eq!(result.action, Action::CreateVehicle);
    assert_eq!(result.processed_by, ProcessedBy::Gemini);
    assert_eq!(result.confidence, 0.95);
}

#[tokio::test]
async fn registration_total_failure_aggregates_provider_errors() {
    let (_dir, agent) = agent_with(vec![stub("Groq", Err("HTTP 429 Too Many Requests"))]);
    let result = agent
        .process_voice_command("cadastrar honda civic 2020", &ctx())
        .await;
    assert_eq!(result.action, Action::Error);
    assert_eq!(result.confidence, 0.0);
    assert!(result.response.contains("Groq: HTTP 429"));
    assert!(result.response.contains("Gemini: não configurado"));
}

#[tokio::test]
async fn result_serializes_with_wire_field_names() {
    let (_dir, agent) = agent_with(vec![]);
    let result = agent
        .process_voice_command("quantos carros tenho", &local_ctx())
        .await;
    let json = serde_json::to_value(&result).expect("serialize");
    assert_eq!(json["action"], "success");
    assert_eq!(json["processed_by"], "local");
    assert!(json["confidence"].is_number());
    assert!(json.get("data").is_none());
}
