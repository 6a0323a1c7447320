use anyhow::Result;
use choromap::{plot_geospatial_data, ValueMapping};
use std::fs;

/// Example: choropleth of a small inline GeoJSON, no GDAL data needed
fn main() -> Result<()> {
    println!("=== Example: choropleth from GeoJSON ===\n");

    let output_dir = std::path::Path::new("./output");
    fs::create_dir_all(output_dir)?;

    let input = output_dir.join("zips.geojson");
    fs::write(
        &input,
        r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature",
             "properties": {"ZIP": "92037", "City": "La Jolla", "Total_Cars": 100, "Total_EV": 12},
             "geometry": {"type": "Polygon", "coordinates": [[[-117.28, 32.82], [-117.22, 32.82], [-117.22, 32.88], [-117.28, 32.88], [-117.28, 32.82]]]}},
            {"type": "Feature",
             "properties": {"ZIP": "92092", "City": "La Jolla", "Total_Cars": 50, "Total_EV": 3},
             "geometry": {"type": "Polygon", "coordinates": [[[-117.22, 32.86], [-117.20, 32.86], [-117.20, 32.88], [-117.22, 32.88], [-117.22, 32.86]]]}},
            {"type": "Feature",
             "properties": {"ZIP": "92046", "City": "Escondido", "Total_Cars": 70, "Total_EV": 4},
             "geometry": {"type": "Polygon", "coordinates": [[[-117.10, 33.10], [-117.05, 33.10], [-117.05, 33.15], [-117.10, 33.15], [-117.10, 33.10]]]}}
        ]}"#,
    )?;

    let mapping = ValueMapping::new(vec![("92092", 100.0), ("92037", 120.0), ("92046", 140.0)])?;
    let output = output_dir.join("cars.html");

    plot_geospatial_data(&input, mapping, "ZIP", "Number of Cars", &output)?;

    println!("Map saved to {:?}", output);
    Ok(())
}
