use anyhow::Result;
use choromap::collect::global_variables::{
    CALIFORNIA_CENTER, CALIFORNIA_ZOOM, EV_DATASET_TOOLTIP_FIELDS,
};
use choromap::{GeoChoroplethRenderer, RenderConfig};
use std::collections::HashMap;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Example: number of cars per California ZIP code
///
/// Expects the California ZIP code shapefile (with the EV statistics
/// columns) next to the working directory. Set RUST_LOG=debug for details.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    println!("=== Example: California ZIP code choropleth ===\n");

    let file_path = "California_Zip_Codes/California_Zip_Codes.shp";
    let data_dict: HashMap<String, f64> = [("92092", 100.0), ("92037", 120.0), ("92046", 140.0)]
        .into_iter()
        .map(|(zip, cars)| (zip.to_string(), cars))
        .collect();
    let join_col_name = "ZIP_CODE";
    let value_name = "Number of Cars";
    let output_file_name = "california_cars.html";

    let mut config = RenderConfig::default();
    config.map.center = Some(CALIFORNIA_CENTER);
    config.map.zoom_start = CALIFORNIA_ZOOM;
    config.map.title = "California cars by ZIP code".to_string();
    config.overlay.tooltip_fields = Some(
        EV_DATASET_TOOLTIP_FIELDS
            .iter()
            .map(|field| field.to_string())
            .collect(),
    );

    println!("Input: {}", file_path);
    println!("  - Join column: {}", join_col_name);
    println!("  - ZIP codes with a value: {}\n", data_dict.len());

    let renderer = GeoChoroplethRenderer::new(config);
    renderer.render(
        file_path,
        data_dict,
        join_col_name,
        value_name,
        output_file_name,
    )?;

    println!("Map saved to {}", output_file_name);
    Ok(())
}
