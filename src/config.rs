use std::time::Duration;

use clap::{Arg, ArgAction, ArgMatches};
use url::Url;

use crate::{datamuse::DATAMUSE_ENDPOINT, error::ConfigError, group_by::KeyOrder};

/// Settings shared by the interactive and one-shot binaries.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub endpoint: Url,
    /// Forwarded to the service as `max`; `None` leaves its default.
    pub max_results: Option<u32>,
    /// No timeout unless set: a hung request keeps the loading placeholder up.
    pub timeout: Option<Duration>,
    pub key_order: KeyOrder,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DATAMUSE_ENDPOINT).expect("default endpoint is a valid url"),
            max_results: None,
            timeout: None,
            key_order: KeyOrder::default(),
        }
    }
}

impl LookupConfig {
    pub fn args() -> Vec<Arg> {
        vec![
            Arg::new("endpoint")
                .long("endpoint")
                .short('e')
                .default_value(DATAMUSE_ENDPOINT)
                .help("word-association service url"),
            Arg::new("max")
                .long("max")
                .short('m')
                .help("maximum number of words to request"),
            Arg::new("timeout")
                .long("timeout")
                .short('t')
                .help("request timeout in seconds"),
            Arg::new("numeric-order")
                .long("numeric-order")
                .action(ArgAction::SetTrue)
                .help("sort syllable groups numerically instead of as text"),
        ]
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Self, ConfigError> {
        let endpoint = match matches.get_one::<String>("endpoint") {
            Some(s) => parse_endpoint(s)?,
            None => Self::default().endpoint,
        };
        let max_results = parse_number::<u32>(matches, "max")?;
        let timeout = parse_number::<u64>(matches, "timeout")?.map(Duration::from_secs);
        let key_order = match matches.get_flag("numeric-order") {
            true => KeyOrder::Numeric,
            false => KeyOrder::Lexical,
        };

        Ok(Self { endpoint, max_results, timeout, key_order })
    }
}

pub fn parse_endpoint(s: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(s).map_err(|source| ConfigError::Endpoint {
        value: s.to_owned(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::Scheme(s.to_owned())),
    }
}

fn parse_number<T: std::str::FromStr>(
    matches: &ArgMatches,
    option: &'static str,
) -> Result<Option<T>, ConfigError> {
    matches
        .get_one::<String>(option)
        .map(|s| {
            s.trim().parse::<T>().map_err(|_| ConfigError::Number {
                option,
                value: s.to_owned(),
            })
        })
        .transpose()
}
