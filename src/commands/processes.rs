use anyhow::Result;
use clap::ArgMatches;

use crate::core::system_monitor::processes::{top_processes, ProcessSort, DEFAULT_PROCESS_LIMIT};
use crate::ui::format_processes;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let sort = match matches.get_one::<String>("sort") {
        Some(value) => value.parse::<ProcessSort>()?,
        None => ProcessSort::default(),
    };
    let limit = matches
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(DEFAULT_PROCESS_LIMIT);

    let processes = top_processes(sort, limit);

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&processes)?);
    } else {
        format_processes(&processes);
    }

    Ok(())
}
