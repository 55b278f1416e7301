use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("paa")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("paa")
        .about("Discover the questions people also ask, and the answers search gives them")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress progress bars and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(--"delay-ms" <MILLIS>)
                .required(false)
                .help("Minimum delay between two search requests, in milliseconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("1000")
                .global(true),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("10")
                .global(true),
        )
        .arg(
            arg!(--"country" <CODE>)
                .required(false)
                .help("Country code passed to the search engine")
                .default_value("us")
                .global(true),
        )
        .arg(
            arg!(--"seed" <SEED>)
                .required(false)
                .help("Pick frontier questions pseudo-randomly from this seed (default: breadth-first)")
                .value_parser(clap::value_parser!(u64))
                .global(true),
        )
        .arg(
            arg!(--"endpoint" <URL>)
                .required(false)
                .help("Search endpoint to query instead of https://www.google.com/search")
                .value_parser(clap::value_parser!(Url))
                .hide(true)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            command!("collect")
                .about(
                    "Expand every seed question in a file and save the related questions \
                as JSON or CSV.",
                )
                .arg(
                    arg!(-i --"input-file" <PATH>)
                        .required(true)
                        .help("Path to a newline-delimited file of seed questions"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(true)
                        .help("JSON file to write, or directory for one CSV file per seed"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Artifact format: json, csv")
                        .value_parser(["json", "csv"])
                        .default_value("json"),
                )
                .arg(
                    arg!(-m --"max-related" <MAX>)
                        .required(false)
                        .help("Number of related questions to gather per seed")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of seeds expanded concurrently.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                ),
        )
        .subcommand(
            command!("related")
                .about("List the questions related to a question")
                .arg(arg!(<QUESTION>).help("The question to expand"))
                .arg(
                    arg!(-m --"max-related" <MAX>)
                        .required(false)
                        .help("Keep expanding until this many questions are found (default: one lookup)")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .subcommand(
            command!("answer")
                .about("Print the featured answer for a question as JSON")
                .arg(arg!(<QUESTION>).help("The question to answer")),
        )
        .subcommand(
            command!("answers")
                .about("Stream answers for a question and the questions it leads to, one JSON record per line")
                .arg(arg!(<QUESTION>).help("The question to start from"))
                .arg(
                    arg!(-l --"limit" <LIMIT>)
                        .required(false)
                        .help("Maximum number of answers to print")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                ),
        )
        .subcommand(
            command!("summarize")
                .about("Print the plain-text answer for a question")
                .arg(arg!(<QUESTION>).help("The question to answer"))
                .arg(
                    arg!(--"fallback")
                        .required(false)
                        .help("Answer the first related question instead when there is no direct answer")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
