use clap::*;
use clonenet::libs::network::edges::read_edges;
use clonenet::libs::network::graph::build_graph;
use clonenet::libs::network::layout::{fruchterman_reingold, write_layout, LayoutOptions};
use std::io::BufRead;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("layout")
        .about("Force-directed layout of an edge list")
        .after_help(
            r###"
Fruchterman-Reingold layout of an undirected graph.

Notes:
* Input: source, target[, weight] per line; a `source` header is skipped
* --nodes adds isolated nodes, one name per line, in that order
* Output: node, x, y; rescaled into [-scale, scale] unless --no-rescale

Examples:
1. Layout of the edges written by `clonenet network`:
   clonenet layout edges.tsv

2. Use edge weights as spring strength, 100 iterations:
   clonenet layout edges.tsv --weighted --iterations 100

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Input edge list. [stdin] for standard input"),
        )
        .arg(
            Arg::new("nodes")
                .long("nodes")
                .num_args(1)
                .help("File of node names, one per line"),
        )
        .arg(
            Arg::new("iterations")
                .long("iterations")
                .num_args(1)
                .default_value("50")
                .value_parser(value_parser!(usize))
                .help("Maximum number of iterations"),
        )
        .arg(
            Arg::new("weighted")
                .long("weighted")
                .action(ArgAction::SetTrue)
                .help("Use edge weights; otherwise every edge counts 1"),
        )
        .arg(
            Arg::new("scale")
                .long("scale")
                .num_args(1)
                .default_value("1")
                .value_parser(value_parser!(f64))
                .help("Largest coordinate after rescaling"),
        )
        .arg(
            Arg::new("no_rescale")
                .long("no-rescale")
                .action(ArgAction::SetTrue)
                .help("Keep raw coordinates"),
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
    let edges = read_edges(args.get_one::<String>("infile").unwrap())?;

    let mut nodes: Vec<String> = vec![];
    if let Some(file) = args.get_one::<String>("nodes") {
        for line in clonenet::reader(file)?.lines() {
            let line = line?;
            let name = line.trim();
            if !name.is_empty() {
                nodes.push(name.to_string());
            }
        }
    }
    let graph = build_graph(&nodes, &edges);

    let opts = LayoutOptions {
        iterations: *args.get_one::<usize>("iterations").unwrap(),
        weighted: args.get_flag("weighted"),
        scale: if args.get_flag("no_rescale") {
            None
        } else {
            Some(*args.get_one::<f64>("scale").unwrap())
        },
        seed: *args.get_one::<u64>("seed").unwrap(),
        ..Default::default()
    };
    let layout = fruchterman_reingold(&graph, &opts)?;

    let mut writer = clonenet::writer(args.get_one::<String>("outfile").unwrap())?;
    write_layout(&mut writer, &layout)?;

    Ok(())
}
