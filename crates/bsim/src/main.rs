use std::sync::Arc;

use anyhow::Context;

use bsim_core::{
    config::{AdvisorBackend, Config},
    messaging::port::MessagingPort,
    model::transport::AdviceTransport,
    relay::AdviceRelay,
};
use bsim_gemini::GeminiTransport;
use bsim_http::AppState;
use bsim_openai::OpenAiTransport;
use bsim_telegram::TelegramMessenger;

fn build_relay(cfg: &Config) -> anyhow::Result<Option<Arc<AdviceRelay>>> {
    let backend = match cfg.advisor_backend() {
        Ok(backend) => backend,
        Err(e) => {
            tracing::warn!("{e}; advice requests will be rejected");
            return Ok(None);
        }
    };

    let transport: Arc<dyn AdviceTransport> = match backend {
        AdvisorBackend::OpenAi(settings) => {
            tracing::info!(model = %settings.model, "advice upstream: openai");
            Arc::new(OpenAiTransport::new(settings).context("building openai transport")?)
        }
        AdvisorBackend::Gemini(settings) => {
            tracing::info!(
                model = %settings.model,
                streaming = settings.streaming,
                "advice upstream: gemini"
            );
            Arc::new(GeminiTransport::new(settings).context("building gemini transport")?)
        }
    };
    Ok(Some(Arc::new(AdviceRelay::new(transport))))
}

async fn build_messenger(cfg: &Config) -> anyhow::Result<Option<Arc<dyn MessagingPort>>> {
    let Some(token) = &cfg.telegram_bot_token else {
        tracing::info!("TELEGRAM_BOT_TOKEN not set; webhook endpoint disabled");
        return Ok(None);
    };

    let telegram = TelegramMessenger::new(token.clone());
    if let Some(url) = &cfg.telegram_webhook_url {
        telegram
            .register_webhook(url)
            .await
            .context("registering telegram webhook")?;
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(telegram);
    Ok(Some(messenger))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bsim_core::logging::init("bsim")?;

    let cfg = Arc::new(Config::load().context("loading configuration")?);

    let relay = build_relay(&cfg)?;
    let messenger = build_messenger(&cfg).await?;

    bsim_http::serve(AppState {
        cfg,
        relay,
        messenger,
    })
    .await
    .context("http server failed")?;

    Ok(())
}
