use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dust_client::{ConfigError, DustConfig, MessageContext};
use dust_proxy::{AppState, PollSettings, ProxyConfig, ResolverKind, StreamSettings};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug, Clone)]
#[command(name = "dust-proxy")]
#[command(about = "HTTP proxy in front of Dust assistant conversations")]
#[command(version)]
struct Cli {
    /// Bind address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Default resolution strategy when a request does not pick one (poll or stream)
    #[arg(long, env = "PROXY_RESOLVER", default_value = "poll")]
    resolver: ResolverKind,

    /// Poll attempts before answering 408
    #[arg(long, env = "PROXY_POLL_MAX_ATTEMPTS", default_value = "15")]
    poll_max_attempts: u32,

    /// Pause before each poll attempt, in milliseconds
    #[arg(long, env = "PROXY_POLL_INTERVAL_MS", default_value = "2000")]
    poll_interval_ms: u64,

    /// Upper bound on a streamed read, in seconds
    #[arg(long, env = "PROXY_STREAM_DEADLINE_SECS", default_value = "120")]
    stream_deadline_secs: u64,

    /// Timezone sent in the message context
    #[arg(long, env = "DUST_TIMEZONE", default_value = "Europe/Paris")]
    timezone: String,

    /// Username sent in the message context
    #[arg(long, env = "DUST_USERNAME", default_value = "Figma Plugin User")]
    username: String,

    /// Log filter, e.g. `info` or `dust_proxy=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn proxy_config(&self) -> ProxyConfig {
        ProxyConfig {
            default_resolver: self.resolver,
            poll: PollSettings {
                max_attempts: self.poll_max_attempts,
                interval: Duration::from_millis(self.poll_interval_ms),
            },
            stream: StreamSettings {
                deadline: Duration::from_secs(self.stream_deadline_secs),
            },
            message_context: MessageContext {
                timezone: self.timezone.clone(),
                username: self.username.clone(),
            },
        }
    }
}

fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
                .with_file(false),
        )
        .init();
}

/// Missing credentials still let the server start; malformed values do not.
fn load_dust_config() -> anyhow::Result<Option<DustConfig>> {
    match DustConfig::from_env() {
        Ok(config) => Ok(Some(config)),
        Err(ConfigError::Missing(name)) => {
            tracing::warn!("{} is not set, every proxy request will answer 500", name);
            Ok(None)
        }
        Err(e) => Err(e).context("invalid Dust configuration"),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    tracing::info!("Starting Dust proxy...");

    let config = cli.proxy_config();
    config.validate().context("invalid proxy configuration")?;
    tracing::info!(
        "Resolver: {} (poll {} x {:?}, stream deadline {:?})",
        config.default_resolver,
        config.poll.max_attempts,
        config.poll.interval,
        config.stream.deadline
    );

    let state = AppState::from_dust_config(load_dust_config()?, config)?;

    dust_proxy::server::run(&cli.host, cli.port, state)
        .await
        .context("web server failed")?;
    Ok(())
}
