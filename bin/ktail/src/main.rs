use std::time::Instant;

use automata::{prelude::*, show_duration};
use automata_learning::{passive::Internals, KTail};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use owo_colors::OwoColorize;
use tracing::{debug, info, trace};
use tracing_subscriber::{filter, prelude::*};

mod io;

fn with_trace_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("k")
                .short('k')
                .long("bound")
                .required(true)
                .value_parser(value_parser!(usize))
                .help("length of the futures that are compared, at least 1"),
        )
        .arg(
            Arg::new("separator")
                .short('s')
                .long("separator")
                .default_value(" ")
                .help("string that separates the symbols of a trace"),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("file with one trace per line, blank lines and lines starting with # are skipped"),
        )
        .arg(
            Arg::new("traces")
                .num_args(0..)
                .help("traces to learn from, if none are given they are read from --input or stdin"),
        )
}

fn cli() -> Command {
    Command::new("ktail")
        .about("Infers finite automata from traces with the k-tail algorithm")
        .subcommand_required(true)
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .global(true)
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info"),
        )
        .subcommand(with_trace_args(
            Command::new("infer")
                .about("infers a model and prints it")
                .arg(
                    Arg::new("prefix")
                        .short('p')
                        .long("prefix")
                        .default_value("q")
                        .help("prefix of the state names of the model"),
                )
                .arg(
                    Arg::new("no-rename")
                        .long("no-rename")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("prefix")
                        .help("keep the internal state names"),
                )
                .arg(
                    Arg::new("dot")
                        .short('d')
                        .long("dot")
                        .help("write the model in DOT format to this file, - for stdout"),
                )
                .arg(
                    Arg::new("render")
                        .short('r')
                        .long("render")
                        .help("render the model to this PNG file, requires graphviz"),
                )
                .arg(
                    Arg::new("check")
                        .short('c')
                        .long("check")
                        .action(ArgAction::Append)
                        .help("report whether the model accepts this trace, can be repeated"),
                ),
        ))
        .subcommand(with_trace_args(
            Command::new("futures")
                .about("prints the k-futures, equivalence classes and future map of the prefix tree"),
        ))
}

fn setup_logging(matches: &ArgMatches) {
    let level = match matches
        .try_get_one::<String>("verbosity")
        .ok()
        .flatten()
        .map(|m| m.as_str())
    {
        Some("trace") => filter::LevelFilter::TRACE,
        Some("debug") => filter::LevelFilter::DEBUG,
        Some("info") => filter::LevelFilter::INFO,
        _ => filter::LevelFilter::INFO,
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn bound(matches: &ArgMatches) -> usize {
    matches.get_one::<usize>("k").copied().unwrap_or(1)
}

fn infer(matches: &ArgMatches) -> anyhow::Result<()> {
    let sample = io::read_sample(matches)?;
    let learner: KTail = if matches.get_flag("no-rename") {
        KTail::new(bound(matches)).without_renaming()
    } else {
        let prefix = matches
            .get_one::<String>("prefix")
            .map(String::as_str)
            .unwrap_or("q");
        KTail::new(bound(matches)).with_prefix(prefix)
    };

    let start = Instant::now();
    let model = learner.infer(&sample)?;
    info!(
        "inferred model with {} states from {} traces in {}",
        model.size(),
        sample.len(),
        show_duration(start.elapsed())
    );
    println!("{model}");

    if let Some(file_name) = matches.get_one::<String>("dot") {
        let target = Some(file_name).filter(|name| name.as_str() != "-");
        io::to_file_or_stdout(target, &model.dot_representation())?;
    }
    if let Some(file_name) = matches.get_one::<String>("render") {
        debug!("rendering model to {file_name}");
        model.render_to_file_name(file_name)?;
    }

    for word in matches.get_many::<String>("check").into_iter().flatten() {
        let trace = Trace::parse(word, io::separator(matches))?;
        if learner.accepts(&model, trace.symbols()) {
            println!("{} {}", "accepted".green(), trace.show());
        } else {
            println!("{} {}", "rejected".red(), trace.show());
        }
    }
    Ok(())
}

fn print_internals(k: usize, internals: &Internals<String>) {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(["State".to_string(), format!("{k}-future")]);
    for (state, future) in &internals.futures {
        builder.push_record([state.clone(), future.show()]);
    }
    println!(
        "{}",
        builder.build().with(tabled::settings::Style::rounded())
    );

    let mut builder = tabled::builder::Builder::default();
    builder.push_record(["Class".to_string(), "States".to_string()]);
    for (future, states) in &internals.classes {
        builder.push_record([future.show(), states.join(", ")]);
    }
    println!(
        "{}",
        builder.build().with(tabled::settings::Style::rounded())
    );

    print!("{}", internals.future_map);
}

fn futures(matches: &ArgMatches) -> anyhow::Result<()> {
    let sample = io::read_sample(matches)?;
    let k = bound(matches);
    let learner: KTail = KTail::new(k);

    let start = Instant::now();
    let internals = learner.internals(&sample)?;
    info!(
        "computed futures of {} states in {}",
        internals.pta.size(),
        show_duration(start.elapsed())
    );
    print_internals(k, &internals);
    Ok(())
}

pub fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    setup_logging(&matches);

    match matches.subcommand() {
        Some(("infer", sub_matches)) => infer(sub_matches),
        Some(("futures", sub_matches)) => futures(sub_matches),
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::cli;

    #[test]
    fn cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn parses_infer_arguments() {
        let matches = cli()
            .try_get_matches_from([
                "ktail", "infer", "-k", "2", "--check", "a b", "-c", "a", "a b", "a b b",
            ])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "infer");
        assert_eq!(sub.get_one::<usize>("k"), Some(&2));
        assert_eq!(sub.get_many::<String>("check").unwrap().count(), 2);
        assert_eq!(sub.get_many::<String>("traces").unwrap().count(), 2);
        assert_eq!(super::io::separator(sub), " ");
        assert!(!sub.get_flag("no-rename"));
    }

    #[test]
    fn prefix_conflicts_with_no_rename() {
        assert!(cli()
            .try_get_matches_from(["ktail", "infer", "-k", "1", "--prefix", "n", "--no-rename"])
            .is_err());
        assert!(cli().try_get_matches_from(["ktail", "futures", "a"]).is_err());
    }
}
