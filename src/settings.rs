use serde::Deserialize;

#[derive(Deserialize)]
pub struct Settings {
    /// Path to the SQLite database file.
    pub db_path: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_owned()
}

impl Settings {
    /// Reads settings from the environment (`DB_PATH`, `LISTEN_ADDR`),
    /// with `.env` loaded first if present.
    pub fn load() -> anyhow::Result<Settings> {
        dotenv::dotenv().ok();
        let settings = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
