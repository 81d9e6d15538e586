//! fints-dialog - command line FinTS client
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │  Config  │───▶│  Dialog  │───▶│Transport │───▶│   Bank   │
//! │  (YAML)  │    │ (FSM+SCA)│    │ (HTTPS)  │    │          │
//! └──────────┘    └────┬─────┘    └──────────┘    └──────────┘
//!                      │
//!                 TAN prompt (stdin), photoTAN image (file)
//! ```
//!
//! Usage:
//!
//! ```text
//! fints-dialog [--env dev] transactions [--from YYYY-MM-DD] [--to YYYY-MM-DD]
//! fints-dialog [--env dev] camt [--camt053] [--from ..] [--to ..]
//! fints-dialog [--env dev] tan-media
//! ```

use anyhow::{Context, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::io::{BufRead, Write};
use std::sync::Arc;

use fints_dialog::FinTsClient;
use fints_dialog::config::AppConfig;
use fints_dialog::response::DialogResult;
use fints_dialog::segment::builders::CamtVersion;
use fints_dialog::statement::SwiftBlocks;
use fints_dialog::tan::{FileRenderer, MatrixCodeRenderer, TanChallenge, TanPrompt};

// ============================================================
// ARGUMENTS
// ============================================================

fn get_arg(name: &str) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == name && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

fn has_flag(name: &str) -> bool {
    std::env::args().any(|a| a == name)
}

fn get_env() -> String {
    get_arg("--env")
        .or_else(|| get_arg("-e"))
        .unwrap_or_else(|| "dev".to_string())
}

fn get_command() -> Option<String> {
    std::env::args()
        .skip(1)
        .find(|a| matches!(a.as_str(), "transactions" | "camt" | "tan-media"))
}

fn get_date(name: &str) -> anyhow::Result<Option<NaiveDate>> {
    get_arg(name)
        .map(|d| {
            NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .with_context(|| format!("{name} expects YYYY-MM-DD, got {d}"))
        })
        .transpose()
}

// ============================================================
// TAN PROMPT
// ============================================================

/// Reads the TAN from stdin; an empty line cancels
struct ConsoleTanPrompt {
    renderer: FileRenderer,
}

#[async_trait]
impl TanPrompt for ConsoleTanPrompt {
    async fn prompt(&self, challenge: &TanChallenge) -> Option<String> {
        if let Some(code) = &challenge.matrix_code {
            match self.renderer.render(code) {
                Ok(()) => eprintln!(
                    "photoTAN image written to {}",
                    self.renderer.path_for(code).display()
                ),
                Err(e) => tracing::warn!(error = %e, "Could not write photoTAN image"),
            }
        }
        eprintln!("{}", challenge.text);
        eprint!("TAN (empty to cancel): ");
        std::io::stderr().flush().ok();

        let line = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await
        .ok()?
        .ok()?;

        let tan = line.trim().to_string();
        if tan.is_empty() { None } else { Some(tan) }
    }
}

// ============================================================
// OUTPUT
// ============================================================

fn report<T>(result: &DialogResult<T>) {
    for code in &result.codes {
        eprintln!("  [{:?}] {}", code.severity, code);
    }
}

fn ensure_success<T>(result: DialogResult<T>) -> anyhow::Result<T> {
    report(&result);
    result
        .into_result()?
        .data
        .context("operation returned no data")
}

// ============================================================
// MAIN
// ============================================================

async fn run(app_config: AppConfig, command: &str) -> anyhow::Result<()> {
    let conn = app_config
        .bank
        .connection_details()
        .context("building connection details")?;
    let prompt = Arc::new(ConsoleTanPrompt {
        renderer: FileRenderer::new(&app_config.tan.matrix_code_path),
    });
    let mut client = FinTsClient::connect(
        conn,
        app_config.transport.timeout(),
        app_config.tan.dialog_state(),
        prompt,
        app_config.product_id.clone(),
    )?;

    let from = get_date("--from")?;
    let to = get_date("--to")?;

    match command {
        "transactions" => {
            let statements = ensure_success(
                client.transactions_decoded(&SwiftBlocks, from, to).await?,
            )?;
            println!("# booked: {} statements", statements.booked.len());
            for block in &statements.booked {
                println!("{}\n-", block.text);
            }
            println!("# pending: {} statements", statements.pending.len());
            for block in &statements.pending {
                println!("{}\n-", block.text);
            }
        }
        "camt" => {
            let camt = if has_flag("--camt053") {
                CamtVersion::Camt053
            } else {
                CamtVersion::Camt052
            };
            let documents = ensure_success(client.transactions_camt(camt, from, to).await?)?;
            println!("# {} documents", documents.len());
            for doc in documents {
                println!("{doc}");
            }
        }
        "tan-media" => {
            for name in ensure_success(client.request_tan_medium_names().await?)? {
                println!("{name}");
            }
        }
        other => bail!("unknown command {other}"),
    }

    if let Some(system_id) = &client.connection().customer_system_id {
        tracing::info!(system_id = %system_id, "Keep this system id in the bank config");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let Some(command) = get_command() else {
        eprintln!("usage: fints-dialog [--env dev] <transactions|camt|tan-media> [--from YYYY-MM-DD] [--to YYYY-MM-DD] [--camt053]");
        std::process::exit(2);
    };

    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = fints_dialog::logging::init_logging(&app_config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        env = %env,
        command = %command,
        bank = %app_config.bank.url,
        "Starting fints-dialog"
    );

    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    rt.block_on(run(app_config, &command))
}
