use hydrocover::{
    coverage_frame, filter_by_coverage, sort_by_coverage, Hydrocover, JoinPolicy, StationLocator,
};
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    configure_polars_display();
    let metadata = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/stations.csv"));

    let client = Hydrocover::builder()
        .policy(JoinPolicy::CollectAll)
        .build();

    let outcome = client.load().metadata(&metadata).call().await?;
    for failure in &outcome.failures {
        eprintln!("{}: {}", failure, failure.cause);
    }

    println!("{}", coverage_frame(sort_by_coverage(&outcome.series))?);

    let sparse = filter_by_coverage(&outcome.series, 0.9);
    println!("{} stations below 90% coverage:", sparse.len());
    for series in sparse {
        println!("{}", serde_json::to_string(&series.coverage())?);
    }

    let records = outcome
        .series
        .iter()
        .map(|s| s.record().clone())
        .collect::<Vec<_>>();
    if let Some(bbox) = StationLocator::new(records).bounding_box(0.1) {
        println!("Map extent: {:?}", bbox);
    }

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
