/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development,
/// except provider credentials and bot tokens which must be supplied.
/// A provider whose credentials are absent is simply left out of the
/// dispatch chain.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Kie.ai credentials, when configured.
    pub kie: Option<KieSettings>,
    /// Vertex AI credentials, when configured.
    pub vertex: Option<VertexSettings>,
    /// Bot identities this deployment serves.
    pub bots: Vec<BotCredential>,
}

/// Kie.ai connection settings.
#[derive(Debug, Clone)]
pub struct KieSettings {
    pub base_url: String,
    pub api_key: String,
    /// Absolute URL of this service's callback webhook.
    pub callback_url: String,
}

/// Vertex AI connection settings.
#[derive(Debug, Clone)]
pub struct VertexSettings {
    pub base_url: String,
    pub project_id: String,
    pub location: String,
    pub model_id: String,
    pub access_token: String,
}

/// One `name:token` pair from `BOT_TOKENS`.
#[derive(Debug, Clone)]
pub struct BotCredential {
    pub name: String,
    pub token: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                                          |
    /// |-------------------------|--------------------------------------------------|
    /// | `HOST`                  | `0.0.0.0`                                        |
    /// | `PORT`                  | `3000`                                           |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                                             |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                                             |
    /// | `KIE_BASE_URL`          | `https://api.kie.ai`                             |
    /// | `KIE_API_KEY`           | unset (Kie.ai disabled)                          |
    /// | `CALLBACK_BASE_URL`     | `http://localhost:3000`                          |
    /// | `VERTEX_BASE_URL`       | `https://us-central1-aiplatform.googleapis.com`  |
    /// | `VERTEX_PROJECT_ID`     | unset (Vertex disabled)                          |
    /// | `VERTEX_LOCATION`       | `us-central1`                                    |
    /// | `VERTEX_MODEL_ID`       | `veo-2.0-generate-001`                           |
    /// | `VERTEX_ACCESS_TOKEN`   | unset (Vertex disabled)                          |
    /// | `BOT_TOKENS`            | unset; `name:token[,name:token...]`              |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let callback_base_url =
            std::env::var("CALLBACK_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into());

        let kie = std::env::var("KIE_API_KEY").ok().map(|api_key| KieSettings {
            base_url: std::env::var("KIE_BASE_URL")
                .unwrap_or_else(|_| "https://api.kie.ai".into()),
            api_key,
            callback_url: format!("{}/callbacks/video", callback_base_url.trim_end_matches('/')),
        });

        let vertex = match (
            std::env::var("VERTEX_PROJECT_ID").ok(),
            std::env::var("VERTEX_ACCESS_TOKEN").ok(),
        ) {
            (Some(project_id), Some(access_token)) => Some(VertexSettings {
                base_url: std::env::var("VERTEX_BASE_URL")
                    .unwrap_or_else(|_| "https://us-central1-aiplatform.googleapis.com".into()),
                project_id,
                location: std::env::var("VERTEX_LOCATION")
                    .unwrap_or_else(|_| "us-central1".into()),
                model_id: std::env::var("VERTEX_MODEL_ID")
                    .unwrap_or_else(|_| "veo-2.0-generate-001".into()),
                access_token,
            }),
            _ => None,
        };

        let bots = parse_bot_tokens(&std::env::var("BOT_TOKENS").unwrap_or_default());

        Self {
            host,
            port,
            request_timeout_secs,
            shutdown_timeout_secs,
            kie,
            vertex,
            bots,
        }
    }
}

/// Parse the `BOT_TOKENS` value: comma-separated `name:token` pairs.
/// Telegram tokens themselves contain a colon, so only the first one
/// splits the name off.
fn parse_bot_tokens(raw: &str) -> Vec<BotCredential> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|pair| {
            let (name, token) = pair.split_once(':')?;
            if name.is_empty() || token.is_empty() {
                tracing::warn!(pair, "Ignoring malformed BOT_TOKENS entry");
                return None;
            }
            Some(BotCredential {
                name: name.to_string(),
                token: token.to_string(),
            })
        })
        .collect()
}
