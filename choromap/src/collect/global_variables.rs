/// Leaflet release pulled by generated documents at view time
pub const LEAFLET_VERSION: &str = "1.9.4";

pub const LEAFLET_CSS_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css";

pub const LEAFLET_JS_URL: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js";

pub const OSM_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

pub const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Geographic centre of California, `[latitude, longitude]`
pub const CALIFORNIA_CENTER: [f64; 2] = [36.7783, -119.4179];

pub const CALIFORNIA_ZOOM: u8 = 6;

/// Used when the dataset has no geometry to fit the view to
pub const WORLD_CENTER: [f64; 2] = [0.0, 0.0];

pub const WORLD_ZOOM: u8 = 2;

/// Abbreviated shapefile column names and their display labels
pub const DEFAULT_COLUMN_RENAMES: [(&str, &str); 5] = [
    ("Total_Cars", "Total Cars"),
    ("Total_EV", "Total EVs"),
    ("EV_perc", "EV Percentage"),
    ("Median_Hou", "Median Income"),
    ("Total_Popu", "Total Population"),
];

/// Tooltip fields of the California ZIP code EV dataset
pub const EV_DATASET_TOOLTIP_FIELDS: [&str; 7] = [
    "ZIP",
    "City",
    "Total Cars",
    "Total EVs",
    "EV Percentage",
    "Median Income",
    "Total Population",
];
