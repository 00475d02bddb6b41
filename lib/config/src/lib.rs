pub mod http_server;
pub mod log;
pub mod reporting;
pub mod sampling;

use config::{Config, File, FileFormat, FileSourceFile};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    http_server::HttpServerConfig, log::LoggingConfig, reporting::ReportingConfig,
    sampling::SamplingConfig,
};

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// The gateway logger configuration.
    #[serde(default)]
    pub log: LoggingConfig,

    /// Configuration for the HTTP server/listener.
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Trace sampling configuration.
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Error reporting configuration: collector endpoint, credentials
    /// and suppression rules.
    #[serde(default)]
    pub reporting: ReportingConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to parse the configuration file path: {0}")]
    ConfigPathParseError(std::convert::Infallible),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "gateway.config.yaml",
    "gateway.config.yml",
    "gateway.config.json",
    "gateway.config.json5",
];

pub fn load_config(
    override_config_path: Option<String>,
) -> Result<GatewayConfig, GatewayConfigError> {
    let mut config = Config::builder();

    if let Some(path_str) = override_config_path {
        let path_buf = path_str
            .parse::<std::path::PathBuf>()
            .map_err(GatewayConfigError::ConfigPathParseError)?;
        let as_file: File<FileSourceFile, _> = path_buf.into();

        config = config.add_source(as_file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    let cfg = config.build()?.try_deserialize::<GatewayConfig>()?;

    Ok(cfg)
}

pub fn parse_yaml_config(config_raw: &str) -> Result<GatewayConfig, GatewayConfigError> {
    Config::builder()
        .add_source(File::from_str(config_raw, FileFormat::Yaml))
        .build()?
        .try_deserialize::<GatewayConfig>()
        .map_err(GatewayConfigError::ConfigLoadError)
}
