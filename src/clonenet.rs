extern crate clap;
use clap::*;
use tracing_subscriber::EnvFilter;

mod cmd_clonenet;

fn main() -> anyhow::Result<()> {
    let app = Command::new("clonenet")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`clonenet` - Clone networks of BCR/TCR repertoires")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Log progress to stderr; repeat for more detail"),
        )
        .subcommand(cmd_clonenet::network::make_subcommand())
        .subcommand(cmd_clonenet::dist::make_subcommand())
        .subcommand(cmd_clonenet::degree::make_subcommand())
        .subcommand(cmd_clonenet::layout::make_subcommand())
        .after_help(
            r###"Subcommand groups:

* Networks:
    * network - Distances, spanning-tree edges and layouts per clone
    * layout  - Force-directed layout of an edge list

* Distances:
    * dist   - Levenshtein distance matrices of heavy/light chains
    * degree - Weighted clone degree of every cell

Input is a tab-separated AIRR table with clones already assigned.
Set RUST_LOG to override the log level.

"###,
        );

    let matches = app.get_matches();
    init_logging(matches.get_count("verbose"));

    // Check which subcomamnd the user ran...
    match matches.subcommand() {
        Some(("network", sub_matches)) => cmd_clonenet::network::execute(sub_matches),
        Some(("dist", sub_matches)) => cmd_clonenet::dist::execute(sub_matches),
        Some(("degree", sub_matches)) => cmd_clonenet::degree::execute(sub_matches),
        Some(("layout", sub_matches)) => cmd_clonenet::layout::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
