use anyhow::Result;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use magno::agent::{Agent, RequestContext};
use magno::backend::{GeminiBackend, GroqBackend, RemoteExtractor};
use magno::config::Config;
use magno::core::Normalizer;
use magno::dispatcher::{Dispatcher, PreferredAi};
use magno::responder::Responder;
use magno::store::{RecordStore, SqliteStore};

#[derive(Parser)]
#[command(
    name = "magno",
    version,
    about = "Assistente de voz para gestão de estoque de veículos"
)]
struct Args {
    /// Comando a interpretar; sem ele, entra no modo interativo
    command: Option<String>,

    /// Interpretador preferido: auto, groq, gemini ou local
    #[arg(long, default_value = "auto")]
    prefer: PreferredAi,

    /// Caminho do banco de dados sqlite
    #[arg(long)]
    db: Option<PathBuf>,

    /// Logging detalhado
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "magno=debug" } else { "magno=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::load()?;
    let db_path = args
        .db
        .unwrap_or_else(|| PathBuf::from(&config.db_path));
    let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::new(db_path)?);

    let mut backends: Vec<Box<dyn RemoteExtractor>> = Vec::new();
    if config.has_groq() {
        backends.push(Box::new(GroqBackend::new(&config)));
    }
    if config.has_gemini() {
        backends.push(Box::new(GeminiBackend::new(&config)));
    }
    info!(
        "MAGNO iniciado com {} extrator(es) remoto(s)",
        backends.len()
    );

    let dispatcher = Dispatcher::new(backends, Responder::new(Arc::clone(&store)));
    let agent = Agent::new(
        store,
        dispatcher,
        Normalizer::new(&config.voice_corrections),
    );
    let ctx = RequestContext {
        session_id: format!("cli-{}", chrono::Local::now().format("%Y%m%d%H%M%S")),
        preferred: args.prefer,
    };

    match args.command {
        Some(command) => {
            let result = agent.process_voice_command(&command, &ctx).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        None => {
            interactive(&agent, &ctx).await?;
        }
    }

    Ok(())
}

async fn interactive(agent: &Agent, ctx: &RequestContext) -> Result<()> {
    println!("MAGNO - modo interativo. Digite um comando ou 'sair' para encerrar.");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line.to_lowercase().as_str(), "sair" | "exit" | "quit") {
            break;
        }
        let result = agent.process_voice_command(line, ctx).await;
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}
