use std::env;
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/api";
const DEFAULT_CREDENTIALS_PATH: &str = ".fittrack/credentials.json";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub credentials_path: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("FITTRACK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            credentials_path: env::var("FITTRACK_CREDENTIALS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CREDENTIALS_PATH)),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
        }
    }
}
