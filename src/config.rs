use anyhow::{Context, Result};
use clap::Parser;
use std::{env, path::PathBuf};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DB_DIR: &str = "./data";
const DEFAULT_SEED_DIR: &str = "./seed_data";
const DB_FILE_NAME: &str = "travel.db";

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub seed_dir: PathBuf,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Travel bucket list API")]
pub struct Args {
    /// Host to bind to (overrides BUCKETLIST_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BUCKETLIST_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides BUCKETLIST_DATABASE_URL, BUCKETLIST_DB_DIR and DB_DIR)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Directory holding worldcities.csv and landmarks.csv (overrides BUCKETLIST_SEED_DIR)
    #[arg(long)]
    pub seed_dir: Option<PathBuf>,

    /// Run migrations and seeding, then exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::resolve(args, |key| env::var(key))?;
        Ok((cfg, migrate))
    }

    /// Merge parsed arguments over values looked up with `env`.
    ///
    /// `env` has the shape of `std::env::var`: unset variables are
    /// `VarError::NotPresent`, and any other error aborts resolution.
    pub fn resolve(
        args: Args,
        env: impl Fn(&str) -> Result<String, env::VarError>,
    ) -> Result<Self> {
        let var = |key: &str| -> Result<Option<String>> {
            match env(key) {
                Ok(value) => Ok(Some(value)),
                Err(env::VarError::NotPresent) => Ok(None),
                Err(err) => Err(err).with_context(|| format!("reading {}", key)),
            }
        };

        let env_host = var("BUCKETLIST_HOST")?.unwrap_or_else(|| DEFAULT_HOST.into());
        let env_port = match var("BUCKETLIST_PORT")? {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing BUCKETLIST_PORT value `{}`", value))?,
            None => DEFAULT_PORT,
        };
        let env_db = match var("BUCKETLIST_DATABASE_URL")? {
            Some(url) => url,
            None => {
                let dir = match var("BUCKETLIST_DB_DIR")? {
                    Some(dir) => dir,
                    None => var("DB_DIR")?.unwrap_or_else(|| DEFAULT_DB_DIR.into()),
                };
                let path = PathBuf::from(dir).join(DB_FILE_NAME);
                format!("sqlite://{}", path.display())
            }
        };
        let env_seed = var("BUCKETLIST_SEED_DIR")?.unwrap_or_else(|| DEFAULT_SEED_DIR.into());

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            seed_dir: args.seed_dir.unwrap_or_else(|| PathBuf::from(env_seed)),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
