//! Local rule-based responder
//!
//! Answers read-only analytic queries directly against the record store,
//! with zero external configuration. Branches are ordered keyword checks and
//! the first hit wins; upstream classification is not mutually exclusive, so
//! this order is itself part of the contract. Reordering silently changes
//! which answer a given phrase produces.

use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::warn;

use crate::extract::money::format_brl;
use crate::extract::vehicle::{self, KNOWN_BRANDS};
use crate::result::{Action, ActionData, CommandResult, ProcessedBy};
use crate::store::{RecordStore, Stats, VehicleRecord};

lazy_static! {
    static ref QUANTITY: Regex =
        Regex::new(r"(?i)quantos?\s+(veículos?|carros?|automóveis?)|total de (veículos?|carros?)")
            .expect("quantity regex");
    static ref PROFIT: Regex =
        Regex::new(r"(?i)lucro|lucrativ|profit|ganhei|ganho").expect("profit regex");
    static ref STOCK: Regex =
        Regex::new(r"(?i)estoque|disponível|disponivel|tem pra vender").expect("stock regex");
    static ref SALES: Regex = Regex::new(r"(?i)vend(as|i|eu|ido)").expect("sales regex");
    static ref EXPENSES: Regex =
        Regex::new(r"(?i)gast(o|ei|os)|despesa|custo").expect("expenses regex");
    static ref INVESTMENT: Regex =
        Regex::new(r"(?i)invest(i|ido)|total compra|gastei comprando").expect("investment regex");
    static ref REGISTER: Regex = Regex::new(
        r"(?i)cadastr(ar|a|o|e)|adicionar|adiciona|registrar|registra|novo veículo|criar|cria\b|o cadastro"
    )
    .expect("register regex");
    static ref SEARCH: Regex =
        Regex::new(r"(?i)mostrar|buscar|procurar|encontrar|listar|ver\b").expect("search regex");
    static ref STATISTICS: Regex =
        Regex::new(r"(?i)estatística|estatistica|dashboard|resumo|panorama|visão geral|visao geral")
            .expect("statistics regex");
    static ref LISTING: Regex =
        Regex::new(r"(?i)listar|mostrar|ver (todos|veículos)").expect("listing regex");
    static ref GREETING: Regex =
        Regex::new(r"(?i)^(oi|olá|ola|hey|e aí|e ai|bom dia|boa tarde|boa noite)\b")
            .expect("greeting regex");
    static ref HELP: Regex =
        Regex::new(r"(?i)ajuda|help|o que você faz|comandos").expect("help regex");
    static ref NAVIGATE: Regex =
        Regex::new(r"(?i)ir para|abrir|navegar|página|pagina").expect("navigate regex");
}

const HELP_TEXT: &str = "Comandos disponíveis:\n\n\
    Cadastro:\n\
    - \"Cadastrar Honda Civic 2020 preto por 50000\"\n\
    - \"Adicionar Fiat Uno 2015 branco 35000\"\n\n\
    Gastos:\n\
    - \"Placa ABC1234 câmbio r$ 200\"\n\
    - \"Gol placa ABC1234 gastei 80 reais em peça\"\n\n\
    Consultas:\n\
    - \"Quantos veículos tenho?\"\n\
    - \"Qual o lucro?\"\n\
    - \"Mostrar estoque\"\n\
    - \"Estatísticas gerais\"\n\n\
    Busca:\n\
    - \"Mostrar Honda\"\n\
    - \"Listar todos os veículos\"";

const CLARIFY_REGISTER: &str = "Para cadastrar um veículo, preciso de pelo menos a marca e modelo.\n\n\
    Exemplo: \"Cadastrar Honda Civic 2020 preto por 50000\"\n\
    Ou: \"Adicionar Fiat Uno 2015 branco comprei por 30000\"";

/// Local rule-based responder; the guaranteed-available fallback
pub struct Responder {
    store: Arc<dyn RecordStore>,
}

impl Responder {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Answer a command; never fails, confidence stays in [0.3, 1.0]
    pub fn answer(&self, command: &str) -> CommandResult {
        match self.try_answer(command) {
            Ok(result) => result,
            Err(e) => {
                warn!("Responder store failure, using generic fallback: {}", e);
                fallback(command)
            }
        }
    }

    fn try_answer(&self, command: &str) -> crate::error::MagnoResult<CommandResult> {
        let cmd = command.to_lowercase();
        let cmd = cmd.trim();

        if QUANTITY.is_match(cmd) {
            let stats = self.store.stats()?;
            if cmd.contains("estoque") {
                return Ok(CommandResult::success(format!(
                    "Você tem {} veículos em estoque no momento.",
                    stats.in_stock
                )));
            }
            if cmd.contains("vendido") {
                return Ok(CommandResult::success(format!(
                    "Foram vendidos {} veículos até agora.",
                    stats.sold
                )));
            }
            return Ok(CommandResult::success(format!(
                "Você tem {} veículos cadastrados no total. {} em estoque e {} já vendidos.",
                stats.total, stats.in_stock, stats.sold
            )));
        }

        if PROFIT.is_match(cmd) {
            let stats = self.store.stats()?;
            let profit = stats.total_sales - stats.total_invested - stats.total_expenses;
            return Ok(CommandResult::success(format!(
                "Seu lucro líquido é de R$ {}.\nVendas: R$ {}\nInvestimento: R$ {}\nGastos: R$ {}",
                format_brl(profit),
                format_brl(stats.total_sales),
                format_brl(stats.total_invested),
                format_brl(stats.total_expenses)
            )));
        }

        if SALES.is_match(cmd) {
            let stats = self.store.stats()?;
            return Ok(CommandResult::success(format!(
                "Você vendeu {} veículos, totalizando R$ {}.",
                stats.sold,
                format_brl(stats.total_sales)
            )));
        }

        if STOCK.is_match(cmd) {
            let stats = self.store.stats()?;
            if stats.in_stock == 0 {
                return Ok(CommandResult::success(
                    "Você não tem veículos em estoque no momento.",
                ));
            }
            let vehicles = self.store.list_vehicles()?;
            let listing = vehicles
                .iter()
                .filter(|v| v.status == "estoque")
                .map(|v| {
                    format!(
                        "{} {} {} - R$ {}",
                        v.brand,
                        v.model,
                        v.year.map(|y| y.to_string()).unwrap_or_default(),
                        format_brl(v.purchase_price.unwrap_or(0.0))
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            return Ok(CommandResult::success(format!(
                "Você tem {} veículos em estoque:\n{}",
                stats.in_stock, listing
            )));
        }

        if EXPENSES.is_match(cmd) {
            let stats = self.store.stats()?;
            return Ok(CommandResult::success(format!(
                "Total de gastos: R$ {}",
                format_brl(stats.total_expenses)
            )));
        }

        if INVESTMENT.is_match(cmd) {
            let stats = self.store.stats()?;
            return Ok(CommandResult::success(format!(
                "Total investido em compras: R$ {}",
                format_brl(stats.total_invested)
            )));
        }

        // Registration phrased at the local interpreter; extraction failure
        // asks for the minimum fields instead of creating a partial record
        if REGISTER.is_match(cmd) {
            return Ok(match vehicle::extract_vehicle(cmd) {
                Some(extracted) => CommandResult {
                    action: Action::CreateVehicle,
                    response: format!(
                        "Cadastrando veículo: {} {}...",
                        extracted.brand, extracted.model
                    ),
                    data: Some(ActionData::Vehicle(extracted)),
                    confidence: 0.9,
                    processed_by: ProcessedBy::Local,
                },
                None => CommandResult::error(CLARIFY_REGISTER, 0.3),
            });
        }

        if SEARCH.is_match(cmd) {
            if let Some(brand) = KNOWN_BRANDS.iter().find(|b| cmd.contains(*b)) {
                let vehicles = self.store.list_vehicles()?;
                let matching: Vec<&VehicleRecord> = vehicles
                    .iter()
                    .filter(|v| {
                        v.brand.to_lowercase().contains(brand)
                            || v.model.to_lowercase().contains(brand)
                    })
                    .collect();
                if matching.is_empty() {
                    return Ok(CommandResult::success(format!(
                        "Não encontrei nenhum {} cadastrado.",
                        brand
                    )));
                }
                let listing = matching
                    .iter()
                    .map(|v| {
                        format!(
                            "{} {} {} ({}) - Compra: R$ {}",
                            v.brand,
                            v.model,
                            v.year.map(|y| y.to_string()).unwrap_or_default(),
                            v.status,
                            format_brl(v.purchase_price.unwrap_or(0.0))
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                return Ok(CommandResult::success(format!(
                    "Encontrei {} veículo(s):\n{}",
                    matching.len(),
                    listing
                )));
            }
        }

        if STATISTICS.is_match(cmd) {
            let stats = self.store.stats()?;
            return Ok(CommandResult::success(statistics_text(&stats)));
        }

        if LISTING.is_match(cmd) {
            let vehicles = self.store.list_vehicles()?;
            if vehicles.is_empty() {
                return Ok(CommandResult::success("Nenhum veículo cadastrado ainda."));
            }
            let listing = vehicles
                .iter()
                .map(|v| {
                    format!(
                        "{} {} {} ({})",
                        v.brand,
                        v.model,
                        v.year.map(|y| y.to_string()).unwrap_or_default(),
                        v.status
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            return Ok(CommandResult::success(format!(
                "Veículos cadastrados:\n{}",
                listing
            )));
        }

        if GREETING.is_match(cmd) {
            return Ok(CommandResult::success(
                "Olá! Sou o MAGNO, seu assistente de gestão de veículos. Como posso ajudar?\n\n\
                 Você pode me perguntar sobre:\n\
                 - Quantos veículos você tem\n\
                 - Seu lucro atual\n\
                 - Veículos em estoque\n\
                 - Estatísticas gerais",
            ));
        }

        if HELP.is_match(cmd) {
            return Ok(CommandResult::success(HELP_TEXT));
        }

        if NAVIGATE.is_match(cmd) {
            if cmd.contains("veículo") || cmd.contains("veiculo") {
                return Ok(CommandResult::navigate(
                    "/veiculos",
                    "Abrindo página de veículos...",
                ));
            }
            if cmd.contains("dashboard") || cmd.contains("início") || cmd.contains("inicio") {
                return Ok(CommandResult::navigate("/", "Abrindo dashboard..."));
            }
            if cmd.contains("cadastr") || cmd.contains("novo") {
                return Ok(CommandResult::navigate(
                    "/novo-veiculo",
                    "Abrindo formulário de cadastro...",
                ));
            }
        }

        Ok(fallback(cmd))
    }
}

fn statistics_text(stats: &Stats) -> String {
    let profit = stats.total_sales - stats.total_invested - stats.total_expenses;
    format!(
        "Estatísticas Gerais:\n\
         Total de veículos: {}\n\
         Em estoque: {}\n\
         Vendidos: {}\n\
         Total investido: R$ {}\n\
         Total vendas: R$ {}\n\
         Total gastos: R$ {}\n\
         Lucro líquido: R$ {}",
        stats.total,
        stats.in_stock,
        stats.sold,
        format_brl(stats.total_invested),
        format_brl(stats.total_sales),
        format_brl(stats.total_expenses),
        format_brl(profit)
    )
}

fn fallback(command: &str) -> CommandResult {
    let mut result = CommandResult::success(format!(
        "Entendi que você disse: \"{}\"\n\n\
         Não tenho certeza do que você precisa. Tente:\n\
         - \"Quantos veículos tenho?\"\n\
         - \"Qual o lucro?\"\n\
         - \"Mostrar estoque\"\n\
         - \"Ajuda\" para ver todos os comandos",
        command
    ));
    result.confidence = 0.3;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{NewVehicle, SqliteStore};
    use tempfile::TempDir;

    fn responder_with_data() -> (TempDir, Responder) {
        let dir = TempDir::new().expect("temp dir");
        let store = SqliteStore::new(dir.path().join("test.db")).expect("store");
        store
            .create_vehicle(NewVehicle {
                brand: "Honda".to_string(),
                model: "Civic".to_string(),
                year: 2020,
                color: Some("Preto".to_string()),
                plate: Some("ABC1234".to_string()),
                mileage: None,
                purchase_price: 50000.0,
                purchase_date: "2026-01-10".to_string(),
                notes: None,
            })
            .expect("vehicle");
        let responder = Responder::new(Arc::new(
            SqliteStore::new(dir.path().join("test.db")).expect("store"),
        ));
        (dir, responder)
    }

    #[test]
    fn test_quantity_branch() {
        let (_dir, responder) = responder_with_data();
        let result = responder.answer("quantos veículos tenho?");
        assert_eq!(result.action, Action::Success);
        assert!(result.response.contains("1 veículos cadastrados"));
    }

    #[test]
    fn test_profit_branch() {
        let (_dir, responder) = responder_with_data();
        let result = responder.answer("qual o lucro?");
        assert!(result.response.contains("lucro líquido"));
        assert!(result.response.contains("-50.000,00"));
    }

    #[test]
    fn test_stock_branch() {
        let (_dir, responder) = responder_with_data();
        let result = responder.answer("mostrar estoque");
        assert!(result.response.contains("Honda Civic"));
    }

    #[test]
    fn test_registration_passthrough() {
        let (_dir, responder) = responder_with_data();
        let result = responder.answer("cadastrar fiat uno 2015 branco por 30000");
        assert_eq!(result.action, Action::CreateVehicle);
        assert!(matches!(result.data, Some(ActionData::Vehicle(_))));
    }

    #[test]
    fn test_registration_clarification() {
        let (_dir, responder) = responder_with_data();
        let result = responder.answer("cadastrar alguma coisa");
        assert_eq!(result.action, Action::Error);
        assert!(result.confidence <= 0.4);
        assert!(result.response.contains("Cadastrar Honda Civic 2020"));
    }

    #[test]
    fn test_search_by_brand() {
        let (_dir, responder) = responder_with_data();
        let result = responder.answer("mostrar honda");
        assert!(result.response.contains("Encontrei 1 veículo(s)"));

        let result = responder.answer("buscar toyota");
        assert!(result.response.contains("Não encontrei nenhum toyota"));
    }

    #[test]
    fn test_navigation_branch() {
        let (_dir, responder) = responder_with_data();
        let result = responder.answer("ir para veículos");
        assert_eq!(result.action, Action::Navigate);
        assert!(matches!(result.data, Some(ActionData::Route(ref r)) if r == "/veiculos"));
    }

    #[test]
    fn test_greeting_and_help() {
        let (_dir, responder) = responder_with_data();
        assert!(responder.answer("olá").response.contains("MAGNO"));
        assert!(responder.answer("ajuda").response.contains("Comandos"));
    }

    #[test]
    fn test_fallback_low_confidence() {
        let (_dir, responder) = responder_with_data();
        let result = responder.answer("xyzzy sem sentido");
        assert_eq!(result.confidence, 0.3);
        assert!(result.response.contains("Não tenho certeza"));
    }

    #[test]
    fn test_branch_order_sales_before_stock() {
        // a phrase carrying both sales and stock tokens lands on the earlier
        // sales branch
        let (_dir, responder) = responder_with_data();
        let result = responder.answer("quais as vendas do estoque");
        assert!(result.response.contains("vendeu"));
    }
}
