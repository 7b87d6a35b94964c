use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};

use hostpulse::commands;

fn cli() -> Command {
    Command::new("hostpulse")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Host metrics collector: CPU, memory, GPU, disk and network with sensor fallbacks")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("sensor-url")
                .long("sensor-url")
                .value_name("URL")
                .global(true)
                .help("Base URL of the hardware monitor web server (default http://localhost:8085)"),
        )
        .arg(
            Arg::new("no-vendor-tool")
                .long("no-vendor-tool")
                .global(true)
                .help("Never run the GPU vendor command-line tool")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("run")
                .about("Sample continuously, printing one JSON sample per tick")
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("MS")
                        .help("Sampling period in milliseconds")
                        .value_parser(value_parser!(u64).range(1..)),
                )
                .arg(
                    Arg::new("count")
                        .short('n')
                        .long("count")
                        .value_name("N")
                        .help("Stop after N samples")
                        .value_parser(value_parser!(u64).range(1..)),
                ),
        )
        .subcommand(
            Command::new("snapshot")
                .about("Print a single sample")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print JSON instead of a formatted report")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("sensors")
                .about("Inspect the sensor tree endpoint and what was parsed from it")
                .arg(
                    Arg::new("sample-chars")
                        .long("sample-chars")
                        .value_name("N")
                        .help("Also print the first N characters of the raw document")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print JSON instead of a formatted report")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("processes")
                .about("List the processes using the most of a resource")
                .arg(
                    Arg::new("sort")
                        .short('s')
                        .long("sort")
                        .value_name("RESOURCE")
                        .help("Resource to rank by")
                        .value_parser(["cpu", "memory", "disk"])
                        .default_value("cpu"),
                )
                .arg(
                    Arg::new("limit")
                        .short('l')
                        .long("limit")
                        .value_name("N")
                        .help("Number of processes to show (1-100)")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print JSON instead of a table")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}

fn main() -> Result<()> {
    hostpulse::init_logging();

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("run", sub_matches)) => {
            let config = commands::load_config(&matches)?;
            commands::run::execute(sub_matches, &config)
        }
        Some(("snapshot", sub_matches)) => {
            let config = commands::load_config(&matches)?;
            commands::snapshot::execute(sub_matches, &config)
        }
        Some(("sensors", sub_matches)) => {
            let config = commands::load_config(&matches)?;
            commands::sensors::execute(sub_matches, &config)
        }
        Some(("processes", sub_matches)) => commands::processes::execute(sub_matches),
        Some(("version", _)) => commands::version::execute(),
        _ => Ok(()),
    }
}
