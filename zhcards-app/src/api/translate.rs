use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::cli::opts::TranslatorOpts;

/// Chinese → English text translation, used to pre-fill a card's English side.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;
}

pub struct AzureTranslator {
    client: reqwest::Client,
    endpoint: String,
    key: String,
    region: Option<String>,
}

#[derive(Deserialize)]
struct TranslateItem {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    text: String,
}

impl AzureTranslator {
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>, region: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            key: key.into(),
            region,
        }
    }

    /// `None` when no subscription key is configured.
    pub fn from_opts(opts: &TranslatorOpts) -> Option<Self> {
        let key = opts.translator_key.clone().filter(|k| !k.is_empty())?;
        Some(Self::new(
            opts.translator_endpoint.clone(),
            key,
            opts.translator_region.clone(),
        ))
    }
}

#[async_trait]
impl Translator for AzureTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let url = format!("{}/translate", self.endpoint.trim_end_matches('/'));
        let mut req = self
            .client
            .post(url)
            .query(&[("api-version", "3.0"), ("from", "zh-Hans"), ("to", "en")])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .json(&json!([{ "text": text }]));
        if let Some(region) = &self.region {
            req = req.header("Ocp-Apim-Subscription-Region", region);
        }

        let items: Vec<TranslateItem> = req.send().await?.error_for_status()?.json().await?;
        Ok(items
            .into_iter()
            .next()
            .and_then(|i| i.translations.into_iter().next())
            .map(|t| t.text)
            .unwrap_or_default())
    }
}
