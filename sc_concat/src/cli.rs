use std::path::PathBuf;

use anyhow::Context;
use clap::{crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, Command};

use sc_core::concat::RecordKind;
use utils::{common_args, get_threads, init_log, read_list_file};

use crate::config::Config;

/// Set up definition of command options for clap
fn cli_model() -> Command {
    common_args(
        Command::new(crate_name!())
            .about(crate_description!())
            .version(crate_version!())
            .author(crate_authors!()),
    )
    .arg(
        Arg::new("kind")
            .short('k')
            .long("kind")
            .value_parser(value_parser!(RecordKind))
            .value_name("KIND")
            .required(true)
            .help("Record type [comp, insulation]"),
    )
    .arg(
        Arg::new("output_prefix")
            .short('p')
            .long("output-prefix")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .required(true)
            .help("Prefix for output files"),
    )
    .arg(
        Arg::new("file_list")
            .value_parser(value_parser!(PathBuf))
            .value_name("FILE_LIST")
            .required(true)
            .help("Input file with list of per cell record files"),
    )
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m);

    debug!("Processing command line options");

    let nt = get_threads(&m);

    let files: Vec<PathBuf> = read_list_file(
        m.get_one::<PathBuf>("file_list")
            .expect("Missing file list"),
    )
    .with_context(|| "Could not read file list")?
    .into_iter()
    .map(PathBuf::from)
    .collect();
    if files.is_empty() {
        return Err(anyhow!("File list is empty"));
    }
    debug!("Number of input files: {}", files.len());

    let mut cfg = Config::new(
        files,
        *m.get_one::<RecordKind>("kind").expect("Missing record kind"),
        m.get_one::<PathBuf>("output_prefix")
            .expect("Missing output prefix")
            .to_owned(),
    );
    cfg.set_threads(nt);

    Ok(cfg)
}
