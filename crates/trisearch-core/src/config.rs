//! Configuration loader.
//!
//! Merges `config.toml` with `APP_*` environment variables. Every key has a
//! local-development default matching the stock docker setup, so the tool
//! runs with no config file at all.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("APP_"));
        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn qdrant_url(&self) -> String {
        self.get("qdrant.url")
            .unwrap_or_else(|_| "http://localhost:6333".to_string())
    }

    pub fn elasticsearch_url(&self) -> String {
        self.get("elasticsearch.url")
            .unwrap_or_else(|_| "http://localhost:9200".to_string())
    }

    pub fn typesense_url(&self) -> String {
        self.get("typesense.url")
            .unwrap_or_else(|_| "http://localhost:8108".to_string())
    }

    pub fn typesense_api_key(&self) -> String {
        self.get("typesense.api_key").unwrap_or_else(|_| "xyz".to_string())
    }

    pub fn catalog_path(&self) -> String {
        self.get("data.catalog")
            .unwrap_or_else(|_| "assets/programs.json".to_string())
    }

    pub fn embeddings_artifact_path(&self) -> String {
        self.get("data.embeddings_artifact")
            .unwrap_or_else(|_| "assets/programs_with_embeddings.json".to_string())
    }
}
