use clap::Parser;
use pr_travel_guide::core::agent::GREETING;
use pr_travel_guide::utils::error::{ErrorSeverity, TravelError};
use pr_travel_guide::utils::logger;
use pr_travel_guide::{start_agent, CliConfig, SessionStore};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

fn exit_with(e: &TravelError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let config = cli.resolve().unwrap_or_else(|e| exit_with(&e));

    let agent = start_agent(&config, |name| std::env::var(name).ok())
        .await
        .unwrap_or_else(|e| exit_with(&e));

    let mut sessions = SessionStore::new();
    let session_id = cli.session.unwrap_or_else(uuid::Uuid::new_v4);
    tracing::info!("🌴 Session {} ready", session_id);

    println!("🌴 The Hitchhiker's Guide to Puerto Rico");
    println!("{}", GREETING);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }

        let (token_tx, mut token_rx) = mpsc::channel::<String>(64);
        let printer = tokio::spawn(async move {
            let mut stdout = std::io::stdout();
            while let Some(token) = token_rx.recv().await {
                print!("{}", token);
                let _ = stdout.flush();
            }
        });

        let session = sessions.get_or_create(session_id);
        let result = agent.run_turn_streaming(session, input, token_tx).await;
        if let Err(e) = printer.await {
            tracing::warn!("Token printer stopped: {}", e);
        }

        match result {
            Ok(_) => println!("\n"),
            Err(e) => {
                tracing::error!("Turn failed: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            }
        }
    }

    println!("¡Buen viaje! 🏝️");
    Ok(())
}
