use clap::*;
use clonenet::libs::airr::{load_contigs, NetworkInput};
use clonenet::libs::network::{edges, generate_network, layout};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("network")
        .about("Builds a clone network: spanning-tree edges and layouts")
        .after_help(
            r###"
Links cells by the Levenshtein distance of their heavy and light chains.

* Every chain slot (heavy, light_0, light_1, ...) gives one distance matrix;
  the matrices are summed (--mode simple) or weighted (--mode weighted).
* Within each clone (or clone group with --by-group) a minimum spanning tree
  keeps the shortest links. All cells of a clone are linked as well, so
  identical cells are never dropped.
* Edge weights are the combined distances.

Two layouts are produced: one of all cells, and one of a trimmed graph.
With --min-size 2 the trimmed graph drops cells without edges; with a larger
value it drops cells having more edges than --min-size.

Output:
* outfile: source, target, weight
* --layout / --layout-trimmed: node, x, y

Examples:
1. Edges to screen:
   clonenet network contigs.tsv

2. Edges and both layouts, nucleotide distances:
   clonenet network contigs.tsv --seq nt -o edges.tsv --layout full.tsv --layout-trimmed trimmed.tsv

3. Trees per clone group, heavy chain weighted 0.7:
   clonenet network contigs.tsv --by-group --mode weighted --weights 0.7,0.3

"###,
        );

    super::table_args(cmd)
        .arg(
            Arg::new("by_group")
                .long("by-group")
                .action(ArgAction::SetTrue)
                .help("Build trees per clone group (<clone-key>_group, or derived with --sep)"),
        )
        .arg(
            Arg::new("sep")
                .long("sep")
                .num_args(1)
                .default_value("0,_")
                .help("Derive clone groups from clone ids: field index and separator"),
        )
        .arg(
            Arg::new("min_size")
                .long("min-size")
                .num_args(1)
                .default_value("2")
                .value_parser(value_parser!(usize))
                .help("Trimming threshold of the secondary graph"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .num_args(1)
                .default_value("7")
                .value_parser(value_parser!(u64))
                .help("Random seed of the initial layout"),
        )
        .arg(
            Arg::new("layout")
                .long("layout")
                .num_args(1)
                .help("Write the layout of the full graph to this file"),
        )
        .arg(
            Arg::new("layout_trimmed")
                .long("layout-trimmed")
                .num_args(1)
                .help("Write the layout of the trimmed graph to this file"),
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
    let opts = super::network_options(args)?;

    let contigs = load_contigs(infile, &opts.clone_key)?;
    let network = generate_network(NetworkInput::Table(contigs), &opts)?;

    let mut writer = clonenet::writer(args.get_one::<String>("outfile").unwrap())?;
    edges::write_edges(&mut writer, &network.edges)?;

    if let Some(file) = args.get_one::<String>("layout") {
        let mut writer = clonenet::writer(file)?;
        layout::write_layout(&mut writer, &network.layout.0)?;
    }
    if let Some(file) = args.get_one::<String>("layout_trimmed") {
        let mut writer = clonenet::writer(file)?;
        layout::write_layout(&mut writer, &network.layout.1)?;
    }

    Ok(())
}
