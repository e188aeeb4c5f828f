use clap::*;
use clonenet::libs::airr::{load_contigs, CloneData};
use clonenet::libs::network::degree::{clone_degree, write_degree};
use clonenet::libs::network::{build_distances, SparseMatrix};
use indexmap::IndexMap;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("degree")
        .about("Weighted clone degree of every cell")
        .after_help(
            r###"
The distance matrices of all chain slots are summed into one weighted
adjacency; the degree of a cell is the sum of its distances to all others.

--mode and --weights are accepted for symmetry with `network`; the degree
always uses the plain sum.

Examples:
1. Clone degree of each cell:
   clonenet degree contigs.tsv -o degree.tsv

"###,
        );

    super::table_args(cmd).arg(
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
    let opts = super::network_options(args)?;

    let data = CloneData::from_contigs(load_contigs(infile, &opts.clone_key)?);
    let dist = build_distances(&data, &opts)?;
    let sparse: IndexMap<String, SparseMatrix> = dist
        .layers
        .iter()
        .map(|(k, m)| (k.clone(), SparseMatrix::from_dense(m)))
        .collect();

    let degree = clone_degree(&dist.cells, &sparse)?;

    let mut writer = clonenet::writer(args.get_one::<String>("outfile").unwrap())?;
    write_degree(&mut writer, &degree)?;

    Ok(())
}
