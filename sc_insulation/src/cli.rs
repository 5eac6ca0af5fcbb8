use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::Context;
use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    Command,
};

use sc_core::{InsulationParams, ZeroDivisionPolicy};
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
        Arg::new("input_dir")
            .short('D')
            .long("input-dir")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .required(true)
            .help("Directory of imputed matrices"),
    )
    .arg(
        Arg::new("output_dir")
            .short('d')
            .long("output-dir")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .help("Set output directory [default: input directory]"),
    )
    .arg(
        Arg::new("chrom")
            .short('c')
            .long("chrom")
            .value_parser(value_parser!(String))
            .value_name("STRING")
            .required(true)
            .help("Chromosome to process"),
    )
    .arg(
        Arg::new("mode")
            .short('m')
            .long("mode")
            .value_parser(value_parser!(String))
            .value_name("STRING")
            .required(true)
            .help("Suffix of imputed matrix file names"),
    )
    .arg(
        Arg::new("window")
            .short('w')
            .long("window")
            .value_parser(value_parser!(NonZeroUsize))
            .value_name("INT")
            .default_value("10")
            .help("Window size (in bins) for insulation score"),
    )
    .arg(
        Arg::new("propagate_nan")
            .long("propagate-nan")
            .action(ArgAction::SetTrue)
            .help("Report NaN rather than 0 for bins with no contacts around them"),
    )
    .arg(
        Arg::new("cell_list")
            .value_parser(value_parser!(PathBuf))
            .value_name("CELL_LIST")
            .required(true)
            .help("Input file with list of cell identifiers"),
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

    let cells = read_list_file(
        m.get_one::<PathBuf>("cell_list")
            .expect("Missing cell list file"),
    )
    .with_context(|| "Could not read cell list")?;
    if cells.is_empty() {
        return Err(anyhow!("Cell list is empty"));
    }
    debug!("Number of cells: {}", cells.len());

    let window = usize::from(
        *m.get_one::<NonZeroUsize>("window")
            .expect("Missing default window"),
    );
    let zero_total = if m.get_flag("propagate_nan") {
        ZeroDivisionPolicy::Propagate
    } else {
        ZeroDivisionPolicy::Zero
    };
    let params = InsulationParams { window, zero_total };
    params.validate()?;

    let mut cfg = Config::new(
        cells,
        m.get_one::<PathBuf>("input_dir")
            .expect("Missing input directory")
            .to_owned(),
        m.get_one::<String>("chrom")
            .expect("Missing chromosome")
            .clone(),
        m.get_one::<String>("mode").expect("Missing mode").clone(),
        params,
    );

    if let Some(p) = m.get_one::<PathBuf>("output_dir") {
        cfg.set_output_dir(p.to_owned())
    }

    cfg.set_threads(nt);

    Ok(cfg)
}
