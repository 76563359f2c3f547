use std::{error::Error, io};

use clap::{Arg, Command};
use log::{debug, info};
use serde::Serialize;
use word_lookup::{
    config::LookupConfig,
    datamuse::{DatamuseClient, Item, Relation, WordSource},
    group_by::{group_by_ordered, Grouped, KeySelector},
    lookup::{Lookup, SYLLABLES_FIELD},
    render::TerminalSurface,
};

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum Words {
    Groups(Grouped<Item>),
    Words(Vec<Item>),
}

#[derive(Serialize)]
struct QueryOutput {
    description: String,
    #[serde(flatten)]
    words: Words,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let matches = Command::new("word_query")
        .about("One-shot rhyme or similar-word lookup")
        .arg(Arg::new("relation")
            .required(true)
            .value_parser(["rhymes", "similar"]))
        .arg(Arg::new("word")
            .required(true))
        .arg(Arg::new("format")
            .long("format")
            .short('f')
            .value_parser(["text", "json", "yaml"])
            .default_value("text"))
        .args(LookupConfig::args())
        .get_matches();

    let relation: Relation = matches.get_one::<String>("relation")
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(Relation::Rhymes);
    let word = matches.get_one::<String>("word").cloned().unwrap_or_default();
    let format = matches.get_one::<String>("format").map(String::as_str).unwrap_or("text");
    let config = LookupConfig::from_matches(&matches)?;
    let client = DatamuseClient::new(&config)?;

    if format == "text" {
        let lookup = Lookup::new(
            client,
            TerminalSurface::without_saved_words(io::stdout()),
            config.key_order,
        );
        let outcome = lookup.show(relation, &word).await;
        debug!("lookup finished: {}", outcome);
        return Ok(());
    }

    info!("querying {} for `{}`...", relation, word);
    let items = client.fetch(relation, &word).await?;
    let words = match relation {
        Relation::Rhymes => Words::Groups(group_by_ordered(
            items, &KeySelector::field(SYLLABLES_FIELD), config.key_order)),
        Relation::Similar => Words::Words(items),
    };
    let result = QueryOutput { description: relation.describe(&word), words };

    match format {
        "yaml" => print!("{}", serde_yaml::to_string(&result)?),
        _ => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}
