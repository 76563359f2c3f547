use std::{io, sync::Arc};

use clap::Command;
use log::{error, info};
use tokio::io::BufReader;
use word_lookup::{
    config::LookupConfig,
    datamuse::DatamuseClient,
    lookup::Lookup,
    render::TerminalSurface,
    session::{run_session, HELP},
};

#[tokio::main]
async fn main() {
    env_logger::init();

    let matches = Command::new("word_lookup")
        .about("Look up rhymes and similar words, and keep a list of the ones you like")
        .args(LookupConfig::args())
        .get_matches();

    let config = match LookupConfig::from_matches(&matches) {
        Ok(config) => config,
        Err(err) => {
            error!("invalid configuration: {}", err);
            std::process::exit(2);
        }
    };
    let client = match DatamuseClient::new(&config) {
        Ok(client) => client,
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    };
    info!("using {}", config.endpoint);

    println!("{}", HELP);
    let lookup = Arc::new(Lookup::new(
        client,
        TerminalSurface::new(io::stdout()),
        config.key_order,
    ));
    let stdin = BufReader::new(tokio::io::stdin());
    if let Err(err) = run_session(lookup, stdin, io::stdout()).await {
        error!("session ended with an error: {}", err);
    }
}
