use clap::*;
use clonenet::libs::airr::{load_contigs, CloneData};
use clonenet::libs::network::{build_distances, DistanceMatrix};
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("dist")
        .about("Levenshtein distance matrices of heavy/light chains")
        .after_help(
            r###"
Prints one all-vs-all distance matrix of cells in PHYLIP format.

Notes:
* --layer total (default) is the combined matrix used for network edges
* --layer heavy, light_0, light_1, ... selects one chain slot
* A chain missing from a cell counts as the full length of the other chain

Examples:
1. Combined distances:
   clonenet dist contigs.tsv

2. Heavy chain nucleotide distances:
   clonenet dist contigs.tsv --seq nt --layer heavy

"###,
        );

    super::table_args(cmd)
        .arg(
            Arg::new("layer")
                .long("layer")
                .num_args(1)
                .default_value("total")
                .help("Matrix to print: total, heavy, light_0, ..."),
        )
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("outfile")
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let layer = args.get_one::<String>("layer").unwrap();
    let opts = super::network_options(args)?;

    let data = CloneData::from_contigs(load_contigs(infile, &opts.clone_key)?);
    let dist = build_distances(&data, &opts)?;

    let mat: &DistanceMatrix = if layer == "total" {
        &dist.total
    } else {
        dist.layers.get(layer).ok_or_else(|| {
            let names: Vec<&str> = dist.layers.keys().map(|k| k.as_str()).collect();
            anyhow::anyhow!("Layer {} not found. Available: total, {}", layer, names.join(", "))
        })?
    };

    let mut writer = clonenet::writer(args.get_one::<String>("outfile").unwrap())?;
    writer.write_fmt(format_args!("{}\n", dist.cells.len()))?;
    for (i, cell) in dist.cells.iter().enumerate() {
        let row: Vec<String> = mat.row(i).iter().map(|d| format!("{}", d)).collect();
        writer.write_fmt(format_args!("{}\t{}\n", cell, row.join("\t")))?;
    }

    Ok(())
}
