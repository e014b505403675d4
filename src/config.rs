use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;

use crate::geocoder::{GeocoderConfig, GeocoderProvider};
use crate::storage::{DistanceUnit, SchemaValidationMode};

/// Files read into the environment before arguments are parsed
pub const ENV_FILES: [&str; 2] = [".env", "config/config.env"];

#[derive(Parser, Debug, Clone)]
#[command(name = "devcamper")]
#[command(about = "Bootcamp directory REST API with a WebSocket welcome server", long_about = None)]
pub struct Config {
    /// Port for the REST API
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Port for the WebSocket server
    #[arg(long, env = "WS_PORT", default_value_t = 5001)]
    pub ws_port: u16,

    /// Address both servers bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Data directory path
    #[arg(long, env = "DATA_DIR", default_value = "./data")]
    pub data_dir: String,

    #[arg(long, env = "GEOCODER_PROVIDER", value_enum, default_value_t = GeocoderProvider::Mapquest)]
    pub geocoder_provider: GeocoderProvider,

    /// API key for providers that need one (MapQuest)
    #[arg(long, env = "GEOCODER_API_KEY", hide_env_values = true)]
    pub geocoder_api_key: Option<String>,

    /// Override the provider's base URL
    #[arg(long, env = "GEOCODER_BASE_URL")]
    pub geocoder_base_url: Option<String>,

    /// Unit of the distance segment in radius searches
    #[arg(long, env = "DISTANCE_UNIT", value_enum, default_value_t = DistanceUnit::Miles)]
    pub distance_unit: DistanceUnit,

    #[arg(long, env = "SCHEMA_VALIDATION", value_enum, default_value_t = SchemaValidationMode::Strict)]
    pub schema_validation: SchemaValidationMode,

    /// Allowed CORS origin (any origin when unset)
    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,
}

impl Config {
    /// Read every env file into the process environment.
    /// Returns the files that exist but could not be loaded.
    pub fn load_env_files() -> Vec<(String, dotenvy::Error)> {
        ENV_FILES
            .iter()
            .filter_map(|file| load_env_file(file).err().map(|e| (file.to_string(), e)))
            .collect()
    }

    pub fn geocoder(&self) -> GeocoderConfig {
        GeocoderConfig {
            provider: self.geocoder_provider,
            api_key: self.geocoder_api_key.clone(),
            base_url: self.geocoder_base_url.clone(),
        }
    }

    pub fn api_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    pub fn ws_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.ws_port).parse()?)
    }
}

/// Load one env file; a missing file is not an error
pub fn load_env_file<P: AsRef<Path>>(path: P) -> Result<(), dotenvy::Error> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e),
    }
}
