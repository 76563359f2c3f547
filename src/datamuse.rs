use std::{fmt, str::FromStr};

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::{config::LookupConfig, error::{ConfigError, LookupError}, group_by::Record};

pub const DATAMUSE_ENDPOINT: &str = "https://api.datamuse.com/words";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Rhymes,
    Similar,
}

impl Relation {
    pub fn query_param(self) -> &'static str {
        match self {
            Self::Rhymes => "rel_rhy",
            Self::Similar => "ml",
        }
    }

    /// Description line shown above the results for `word`.
    pub fn describe(self, word: &str) -> String {
        match self {
            Self::Rhymes => format!("Words that rhyme with {}:", word),
            Self::Similar => format!("Words with a similar meaning to {}:", word),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rhymes => write!(f, "rhymes"),
            Self::Similar => write!(f, "similar"),
        }
    }
}

impl FromStr for Relation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rhymes" | "rhyme" | "rel_rhy" => Ok(Self::Rhymes),
            "similar" | "synonyms" | "ml" => Ok(Self::Similar),
            x => Err(format!("unknown relation `{}`", x)),
        }
    }
}

/// One entry of a service response, kept as the raw JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(Map<String, Value>);

impl Item {
    pub fn word(&self) -> Option<&str> {
        self.0.get("word").and_then(Value::as_str)
    }

    pub fn num_syllables(&self) -> Option<u64> {
        self.0.get("numSyllables").and_then(Value::as_u64)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Item {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl Record for Item {
    fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

/// Where lookups get their words from.
#[async_trait]
pub trait WordSource: Send + Sync {
    async fn fetch(&self, relation: Relation, word: &str) -> Result<Vec<Item>, LookupError>;
}

#[derive(Debug, Clone)]
pub struct DatamuseClient {
    client: Client,
    endpoint: Url,
    max_results: Option<u32>,
}

impl DatamuseClient {
    pub fn new(config: &LookupConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.clone(),
            max_results: config.max_results,
        })
    }

    pub fn request_url(&self, relation: Relation, word: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(relation.query_param(), word);
            if let Some(max) = self.max_results {
                pairs.append_pair("max", &max.to_string());
            }
        }
        url
    }
}

#[async_trait]
impl WordSource for DatamuseClient {
    async fn fetch(&self, relation: Relation, word: &str) -> Result<Vec<Item>, LookupError> {
        let url = self.request_url(relation, word);
        debug!("requesting {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let body = response.bytes().await?;
        let items: Vec<Item> = serde_json::from_slice(&body)?;
        debug!("{} {} found for `{}`", items.len(), relation, word);
        Ok(items)
    }
}
