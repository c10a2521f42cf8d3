use std::error::Error;
use std::fs;

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

#[macro_use]
extern crate lazy_static;

mod catalog;
mod dom;
mod extract;
mod season;

fn init_logging(verbose: bool) -> Result<(), Box<dyn Error>> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{h({l})} {m}{n}")))
        .build();
    let level = if verbose { LevelFilter::Info } else { LevelFilter::Warn };
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn render_catalog(catalog: &catalog::EpisodeCatalog, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(catalog)
    } else {
        serde_json::to_string(catalog)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let app = clap::Command::new("episcrape")
        .about("Extract an episode catalog (SxxExx codes) from a saved series encyclopedia page")
        .arg(
            clap::Arg::new("input")
                .required(true)
                .help("Saved series page (HTML)"),
        )
        .arg(
            clap::Arg::new("output")
                .long("output")
                .short('o')
                .help("Write the catalog JSON to this file instead of stdout"),
        )
        .arg(
            clap::Arg::new("pretty")
                .long("pretty")
                .help("Pretty-print the JSON output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("verbose")
                .long("verbose")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    init_logging(app.get_flag("verbose"))?;

    let input = app.get_one::<String>("input").expect("Input file required");
    let html = fs::read_to_string(input)?;
    let document = dom::Document::parse(&html);
    let episodes = extract::extract_catalog(&document);

    if episodes.is_empty() {
        log::warn!("No episodes found in {}", input);
    } else {
        log::info!(target: "cli", "Extracted {} episodes from {}", episodes.len(), input);
    }

    let json = render_catalog(&episodes, app.get_flag("pretty"))?;
    match app.get_one::<String>("output") {
        Some(path) => fs::write(path, json)?,
        None => println!("{}", json),
    }
    Ok(())
}
