use std::path::PathBuf;

use anyhow::Context;
use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, Command,
};

use sc_core::{CompartmentParams, CpgTable};
use utils::{common_args, get_threads, init_log, read_list_file};

use crate::config::{Config, InputMode};

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
            .help("Directory of raw or imputed matrices"),
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
            .default_value("raw")
            .help("Suffix of imputed matrix file names, or raw to use contact lists"),
    )
    .arg(
        Arg::new("cpg_file")
            .short('g')
            .long("cpg-file")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .required(true)
            .help("CpG counts per bin generated by bedtools nuc"),
    )
    .arg(
        Arg::new("upper_pct")
            .long("upper-pct")
            .value_parser(value_parser!(f64))
            .value_name("FLOAT")
            .default_value("80")
            .help("Percentile of compartment score above which bins are called A"),
    )
    .arg(
        Arg::new("lower_pct")
            .long("lower-pct")
            .value_parser(value_parser!(f64))
            .value_name("FLOAT")
            .default_value("20")
            .help("Percentile of compartment score below which bins are called B"),
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

    let params = CompartmentParams {
        upper_pct: *m.get_one::<f64>("upper_pct").expect("Missing default"),
        lower_pct: *m.get_one::<f64>("lower_pct").expect("Missing default"),
        ..Default::default()
    };
    params.validate()?;

    // Read in CpG profile for the requested chromosome
    let chrom = m
        .get_one::<String>("chrom")
        .expect("Missing chromosome")
        .clone();
    let cpg_file = m.get_one::<PathBuf>("cpg_file").expect("Missing CpG file");
    let cpg = CpgTable::from_file(cpg_file)
        .with_context(|| format!("Error reading CpG table {}", cpg_file.display()))?
        .profile(&chrom)
        .ok_or_else(|| anyhow!("Chromosome {} not found in {}", chrom, cpg_file.display()))?;
    debug!("CpG profile for {}: {} bins", chrom, cpg.len());

    let mode = InputMode::new(m.get_one::<String>("mode").expect("Missing default mode"));

    let mut cfg = Config::new(
        cells,
        m.get_one::<PathBuf>("input_dir")
            .expect("Missing input directory")
            .to_owned(),
        chrom,
        mode,
        cpg,
    );

    if let Some(p) = m.get_one::<PathBuf>("output_dir") {
        cfg.set_output_dir(p.to_owned())
    }

    cfg.set_params(params);
    cfg.set_threads(nt);

    Ok(cfg)
}
