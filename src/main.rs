use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] bearmaps::osm::Error);

#[derive(Parser)]
struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find the shortest route between two positions and print it as GeoJSON
    Route(RouteArgs),

    /// Select the map tiles for a query box and print them as JSON
    Raster(RasterArgs),
}

#[derive(Args)]
#[command(allow_negative_numbers = true)]
struct RouteArgs {
    /// The path to the OSM file
    osm_file: PathBuf,

    /// Longitude of the start point
    start_lon: f64,

    /// Latitude of the start point
    start_lat: f64,

    /// Longitude of the end point
    end_lon: f64,

    /// Latitude of the end point
    end_lat: f64,

    /// Only load nodes within min_lon,min_lat,max_lon,max_lat
    #[arg(long, value_delimiter = ',', num_args = 4)]
    bbox: Option<Vec<f64>>,

    /// Fail on duplicate node ids instead of keeping the first definition
    #[arg(long)]
    strict: bool,
}

#[derive(Args)]
#[command(allow_negative_numbers = true)]
struct RasterArgs {
    /// Longitude of the upper-left corner of the query box
    ullon: f64,

    /// Latitude of the upper-left corner of the query box
    ullat: f64,

    /// Longitude of the lower-right corner of the query box
    lrlon: f64,

    /// Latitude of the lower-right corner of the query box
    lrlat: f64,

    /// Width of the viewport, in pixels
    w: f64,

    /// Height of the viewport, in pixels
    h: f64,

    /// Prefix of tile image names
    #[arg(long, default_value = "img/")]
    img_root: String,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    colog::default_builder()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Command::Route(args) => route(args),
        Command::Raster(args) => raster(args),
    }
}

fn route(args: RouteArgs) -> Result<(), Box<dyn Error>> {
    let bbox = match args.bbox.as_deref() {
        Some(&[min_lon, min_lat, max_lon, max_lat]) => [min_lon, min_lat, max_lon, max_lat],
        Some(other) => return Err(format!("--bbox needs 4 values, got {}", other.len()).into()),
        None => [0.0; 4],
    };

    let options = bearmaps::osm::Options {
        bbox,
        strict_duplicates: args.strict,
        ..bearmaps::osm::Options::default()
    };
    let g = load_graph(&args.osm_file, &options)?;

    let tree = bearmaps::KDTree::from_graph(&g).ok_or(bearmaps::RouteError::EmptyGraph)?;
    let start = tree.find_nearest_node(args.start_lon, args.start_lat);
    let end = tree.find_nearest_node(args.end_lon, args.end_lat);

    let route = bearmaps::find_route(&g, start.id, end.id, bearmaps::DEFAULT_STEP_LIMIT)?;
    log::info!(
        "found route over {} nodes, length {:.6}",
        route.len(),
        bearmaps::route_length(&g, &route)?
    );

    let coordinates = route
        .iter()
        .map(|&node_id| -> Result<[f64; 2], bearmaps::GraphError> {
            Ok([g.lon(node_id)?, g.lat(node_id)?])
        })
        .collect::<Result<Vec<_>, _>>()?;

    let geojson = serde_json::json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": { "nodes": route },
            "geometry": {
                "type": "LineString",
                "coordinates": coordinates,
            },
        }],
    });
    println!("{}", serde_json::to_string_pretty(&geojson)?);

    Ok(())
}

fn raster(args: RasterArgs) -> Result<(), Box<dyn Error>> {
    let config = bearmaps::RasterConfig {
        img_root: args.img_root,
        ..bearmaps::RasterConfig::default()
    };
    let rasterer = bearmaps::Rasterer::new(&config);

    let result = rasterer.get_map_raster(&bearmaps::RasterRequest {
        ullon: args.ullon,
        ullat: args.ullat,
        lrlon: args.lrlon,
        lrlat: args.lrlat,
        w: args.w,
        h: args.h,
    })?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

fn load_graph<P: AsRef<Path>>(
    path: P,
    options: &bearmaps::osm::Options<'_>,
) -> Result<bearmaps::Graph, GraphLoadError> {
    let mut g = bearmaps::Graph::default();
    match bearmaps::osm::add_features_from_file(&mut g, options, path.as_ref()) {
        Ok(()) => Ok(g),
        Err(e) => Err(GraphLoadError(PathBuf::from(path.as_ref()), e)),
    }
}
