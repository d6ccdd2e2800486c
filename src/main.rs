//! Console host: runs one scripted call over stdin/stdout.
//!
//! ```text
//! call-script "Asha Verma" [agent-name] [language]
//! ```

use std::sync::Arc;

use thiserror::Error;

use call_script::adapters::{ConsoleSynthesis, InMemoryCallRecorder, PostgresCallRecorder, StdinCapture};
use call_script::application::{CallService, CallServiceError, CallSettings, StartCallCommand};
use call_script::config::{AppConfig, ConfigError};
use call_script::domain::dialogue::{DialogueEngine, ScriptError};
use call_script::ports::{CallRecorder, RecorderError};
use call_script::telemetry::{self, TelemetryError};

#[derive(Debug, Error)]
enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Recorder(#[from] RecorderError),

    #[error(transparent)]
    Call(#[from] CallServiceError),
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("call-script: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), HostError> {
    let config = AppConfig::load()?;
    config.validate().map_err(ConfigError::from)?;
    telemetry::init(&config.logging)?;

    let script = config.script.load_script()?;
    tracing::info!(script = %script.name(), "script ready");
    let engine = DialogueEngine::new(script);

    let recorder: Arc<dyn CallRecorder> = match &config.database {
        Some(database) => {
            tracing::info!(url = %database.redacted_url(), "recording calls to postgres");
            Arc::new(PostgresCallRecorder::connect(database).await?)
        }
        None => {
            tracing::info!("no database configured, recording calls in memory");
            Arc::new(InMemoryCallRecorder::new())
        }
    };

    let service = CallService::new(
        engine,
        Arc::new(StdinCapture::new()),
        Arc::new(ConsoleSynthesis),
        recorder,
        CallSettings::from_config(&config),
    );

    let mut args = std::env::args().skip(1);
    let cmd = StartCallCommand {
        customer_name: args.next().unwrap_or_else(|| "Customer".to_string()),
        agent_name: args.next(),
        language: args.next(),
    };

    let record = service.run_call(cmd).await?;
    println!(
        "call {} finished: status={} outcome={} state={} duration={}s",
        record.call_id,
        record.status,
        record.outcome,
        record.final_state,
        record.duration_secs.unwrap_or_default()
    );
    Ok(())
}
