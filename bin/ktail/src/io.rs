use std::{fs::File, io::BufReader};

use anyhow::Context;
use automata_learning::TraceSample;
use clap::ArgMatches;

pub fn separator(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("separator")
        .map(String::as_str)
        .unwrap_or(" ")
}

pub fn to_file_or_stdout(maybe_file_name: Option<&String>, output: &str) -> anyhow::Result<()> {
    if let Some(file_name) = maybe_file_name {
        std::fs::write(file_name, output)
            .with_context(|| format!("unable to write to {file_name}"))?;
    } else {
        println!("{output}");
    }
    Ok(())
}

/// Traces given as arguments take precedence, otherwise they are read line by line from the
/// input file or from stdin.
pub fn read_sample(matches: &ArgMatches) -> anyhow::Result<TraceSample> {
    let separator = separator(matches);
    if let Some(traces) = matches.get_many::<String>("traces") {
        tracing::debug!("taking traces from the command line");
        return Ok(TraceSample::from_strs(traces, separator)?);
    }

    let sample = match matches.get_one::<String>("input") {
        Some(file_name) => {
            let file =
                File::open(file_name).with_context(|| format!("unable to open {file_name}"))?;
            TraceSample::from_reader(BufReader::new(file), separator)?
        }
        None => {
            tracing::debug!("no traces specified, using stdin");
            TraceSample::from_reader(std::io::stdin().lock(), separator)?
        }
    };
    tracing::info!("read {} traces", sample.len());
    Ok(sample)
}
