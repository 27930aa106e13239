use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use waygraph;

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] waygraph::osm::Error);

#[derive(Debug, thiserror::Error)]
#[error("no route from {0} to {1}")]
struct NoRouteError(i64, i64);

#[derive(Parser)]
struct Cli {
    /// The path to the OSM file (plain, gzip or bzip2 compressed)
    osm_file: PathBuf,

    /// Id of the start node
    #[arg(allow_negative_numbers = true)]
    start: i64,

    /// Id of the end node
    #[arg(allow_negative_numbers = true)]
    end: i64,

    /// Abort on the first unparsable line of the OSM file
    #[arg(long)]
    strict: bool,

    /// Save the loaded graph to this file
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Increase logging verbosity (may be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    colog::default_builder()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    let g = load_graph(&cli.osm_file, cli.strict)?;

    if let Some(ref path) = cli.save {
        waygraph::osm::save_graph_to_file(&g, path)?;
    }

    let route = waygraph::shortest_path(&g, cli.start, cli.end)?;
    if !route.success {
        return Err(NoRouteError(cli.start, cli.end).into());
    }

    println!("{{");
    println!("  \"type\": \"FeatureCollection\",");
    println!("  \"features\": [");
    println!("    {{");
    println!("      \"type\": \"Feature\",");
    println!(
        "      \"properties\": {{\"distance_km\": {:.6}}},",
        route.total_distance
    );

    println!("      \"geometry\": {{");
    println!("        \"type\": \"LineString\",");
    println!("        \"coordinates\": [");

    let mut nodes = route
        .path
        .iter()
        .filter_map(|&node_id| g.find_node(node_id))
        .peekable();
    while let Some(node) = nodes.next() {
        let suffix = if nodes.peek().is_some() { "," } else { "" };
        println!("          [{}, {}]{}", node.lon, node.lat, suffix);
    }

    println!("        ]");
    println!("      }}");
    println!("    }}");
    println!("  ]");
    println!("}}");

    Ok(())
}

fn load_graph<P: AsRef<Path>>(path: P, strict: bool) -> Result<waygraph::Graph, GraphLoadError> {
    let options = waygraph::osm::Options {
        file_format: waygraph::osm::FileFormat::Unknown,
        strict,
    };
    waygraph::osm::read_graph_from_file(&options, path.as_ref())
        .map_err(|e| GraphLoadError(PathBuf::from(path.as_ref()), e))
}
