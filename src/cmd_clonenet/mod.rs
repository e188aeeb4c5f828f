//! Subcommand modules for the `clonenet` binary.

pub mod degree;
pub mod dist;
pub mod layout;
pub mod network;

use clap::*;
use clonenet::libs::network::{ClonesSep, DistanceMode, NetworkOptions, SeqType};

/// Arguments shared by every command reading an AIRR table
pub fn table_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("infile")
            .required(true)
            .index(1)
            .help("Input AIRR/changeo TSV file. [stdin] for standard input"),
    )
    .arg(
        Arg::new("clone_key")
            .long("clone-key")
            .num_args(1)
            .default_value("clone_id")
            .help("Column holding clone ids"),
    )
    .arg(
        Arg::new("seq")
            .long("seq")
            .num_args(1)
            .default_value("aa")
            .help("Sequences to compare: aa (sequence_alignment_aa) or nt (sequence_alignment)"),
    )
    .arg(
        Arg::new("mode")
            .long("mode")
            .num_args(1)
            .default_value("simple")
            .value_parser(["simple", "weighted"])
            .help("How layer distances are combined"),
    )
    .arg(
        Arg::new("weights")
            .long("weights")
            .num_args(1)
            .help("Comma separated layer weights for --mode weighted, e.g. 0.5,0.5"),
    )
}

/// Options from the shared arguments, plus the network-only ones when present
pub fn network_options(args: &ArgMatches) -> anyhow::Result<NetworkOptions> {
    let mut opts = NetworkOptions {
        distance_mode: DistanceMode::parse(args.get_one::<String>("mode").unwrap())?,
        seq_type: SeqType::parse(args.get_one::<String>("seq").map(|s| s.as_str()))?,
        clone_key: args.get_one::<String>("clone_key").unwrap().to_string(),
        ..Default::default()
    };

    if let Some(w) = args.get_one::<String>("weights") {
        let weights = w
            .split(',')
            .map(|x| x.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()?;
        opts.weights = Some(weights);
    }

    if let Ok(Some(sep)) = args.try_get_one::<String>("sep") {
        opts.clones_sep = ClonesSep::parse(sep)?;
    }
    if let Ok(Some(&by_group)) = args.try_get_one::<bool>("by_group") {
        opts.construct_by_group = by_group;
    }
    if let Ok(Some(&min_size)) = args.try_get_one::<usize>("min_size") {
        opts.min_size = min_size;
    }
    if let Ok(Some(&seed)) = args.try_get_one::<u64>("seed") {
        opts.seed = seed;
    }

    Ok(opts)
}
