use crate::CLAP_STYLING;
use clap::{arg, command};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("varscout")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("varscout")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Log debug details to stderr")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("scrape")
                .about(
                    "Fetch every listing in the links file and write one spreadsheet row per \
                variant.",
                )
                .arg(
                    arg!(-i --"input" <PATH>)
                        .required(false)
                        .help("Newline-delimited file of listing URLs")
                        .default_value("links.txt"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Spreadsheet (CSV) to write variant rows to")
                        .default_value("output.csv"),
                )
                .arg(
                    arg!(--"found" <PATH>)
                        .required(false)
                        .help("File listing links with at least one variant")
                        .default_value("variation_found.txt"),
                )
                .arg(
                    arg!(--"not-found" <PATH>)
                        .required(false)
                        .help("File listing links without variants")
                        .default_value("variation_not_found.txt"),
                )
                .arg(
                    arg!(--"commit" <POLICY>)
                        .required(false)
                        .help("Flush the spreadsheet after every row or after every link")
                        .value_parser(["row", "link"])
                        .default_value("row"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                )
                .arg(
                    arg!(--"user-agent" <USER_AGENT>)
                        .required(false)
                        .help("User-Agent header sent with every request"),
                ),
        )
        .subcommand(
            command!("inspect")
                .about("Resolve the variants of a saved listing page and print them as JSON")
                .arg(
                    arg!(<FILE>)
                        .required(true)
                        .help("HTML file of a listing page")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
}
