//! ColorBrewer sequential schemes and equal-width value binning

use crate::error::PreconditionError;

const YL_OR_RD: [&[&str]; 7] = [
    &["#ffeda0", "#feb24c", "#f03b20"],
    &["#ffffb2", "#fecc5c", "#fd8d3c", "#e31a1c"],
    &["#ffffb2", "#fecc5c", "#fd8d3c", "#f03b20", "#bd0026"],
    &["#ffffb2", "#fed976", "#feb24c", "#fd8d3c", "#f03b20", "#bd0026"],
    &["#ffffb2", "#fed976", "#feb24c", "#fd8d3c", "#fc4e2a", "#e31a1c", "#b10026"],
    &["#ffffcc", "#ffeda0", "#fed976", "#feb24c", "#fd8d3c", "#fc4e2a", "#e31a1c", "#b10026"],
    &[
        "#ffffcc", "#ffeda0", "#fed976", "#feb24c", "#fd8d3c", "#fc4e2a", "#e31a1c", "#bd0026",
        "#800026",
    ],
];

const YL_GN_BU: [&[&str]; 7] = [
    &["#edf8b1", "#7fcdbb", "#2c7fb8"],
    &["#ffffcc", "#a1dab4", "#41b6c4", "#225ea8"],
    &["#ffffcc", "#a1dab4", "#41b6c4", "#2c7fb8", "#253494"],
    &["#ffffcc", "#c7e9b4", "#7fcdbb", "#41b6c4", "#2c7fb8", "#253494"],
    &["#ffffcc", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8", "#0c2c84"],
    &["#ffffd9", "#edf8b1", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8", "#0c2c84"],
    &[
        "#ffffd9", "#edf8b1", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8", "#253494",
        "#081d58",
    ],
];

const BLUES: [&[&str]; 7] = [
    &["#deebf7", "#9ecae1", "#3182bd"],
    &["#eff3ff", "#bdd7e7", "#6baed6", "#2171b5"],
    &["#eff3ff", "#bdd7e7", "#6baed6", "#3182bd", "#08519c"],
    &["#eff3ff", "#c6dbef", "#9ecae1", "#6baed6", "#3182bd", "#08519c"],
    &["#eff3ff", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#084594"],
    &["#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#084594"],
    &[
        "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
        "#08306b",
    ],
];

const GREENS: [&[&str]; 7] = [
    &["#e5f5e0", "#a1d99b", "#31a354"],
    &["#edf8e9", "#bae4b3", "#74c476", "#238b45"],
    &["#edf8e9", "#bae4b3", "#74c476", "#31a354", "#006d2c"],
    &["#edf8e9", "#c7e9c0", "#a1d99b", "#74c476", "#31a354", "#006d2c"],
    &["#edf8e9", "#c7e9c0", "#a1d99b", "#74c476", "#41ab5d", "#238b45", "#005a32"],
    &["#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476", "#41ab5d", "#238b45", "#005a32"],
    &[
        "#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476", "#41ab5d", "#238b45", "#006d2c",
        "#00441b",
    ],
];

/// Classes of a scheme, indexed by `n - 3`
fn scheme_table(name: &str) -> Option<&'static [&'static [&'static str]; 7]> {
    match name {
        "YlOrRd" => Some(&YL_OR_RD),
        "YlGnBu" => Some(&YL_GN_BU),
        "Blues" => Some(&BLUES),
        "Greens" => Some(&GREENS),
        _ => None,
    }
}

fn split_reversed(scheme: &str) -> (&str, bool) {
    match scheme.strip_suffix("_r") {
        Some(base) => (base, true),
        None => (scheme, false),
    }
}

/// True for a supported scheme name, with or without the `_r` suffix
pub fn is_known_scheme(scheme: &str) -> bool {
    scheme_table(split_reversed(scheme).0).is_some()
}

/// `n` colours of a ColorBrewer scheme
///
/// Fewer than 3 classes use the 3-class palette truncated; more than 9 are
/// interpolated linearly between the 9-class colours.
pub fn color_brewer(scheme: &str, n: usize) -> Option<Vec<String>> {
    let (base, reversed) = split_reversed(scheme);
    let table = scheme_table(base)?;

    let mut colors: Vec<String> = match n {
        0 => Vec::new(),
        1..=2 => table[0][..n].iter().map(|c| c.to_string()).collect(),
        3..=9 => table[n - 3].iter().map(|c| c.to_string()).collect(),
        _ => interpolate(table[6], n),
    };
    if reversed {
        colors.reverse();
    }
    Some(colors)
}

fn parse_hex(color: &str) -> [f64; 3] {
    let channel = |i: usize| {
        u8::from_str_radix(color.get(1 + 2 * i..3 + 2 * i).unwrap_or("00"), 16).unwrap_or(0) as f64
    };
    [channel(0), channel(1), channel(2)]
}

fn interpolate(palette: &[&str], n: usize) -> Vec<String> {
    let stops: Vec<[f64; 3]> = palette.iter().map(|c| parse_hex(c)).collect();
    let last = (stops.len() - 1) as f64;

    (0..n)
        .map(|i| {
            let position = i as f64 * last / (n - 1) as f64;
            let lower = (position.floor() as usize).min(stops.len() - 2);
            let t = position - lower as f64;
            let rgb: Vec<u8> = (0..3)
                .map(|k| (stops[lower][k] + (stops[lower + 1][k] - stops[lower][k]) * t).round() as u8)
                .collect();
            format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
        })
        .collect()
}

/// Step colour scale over equal-width bins
///
/// `edges` holds `bins + 1` boundaries and `colors` one colour per bin.
/// A value takes the colour of the last edge not above it; the maximum
/// belongs to the last bin.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    edges: Vec<f64>,
    colors: Vec<String>,
}

impl ColorScale {
    pub fn from_values<I>(values: I, bins: usize, scheme: &str) -> Result<Self, PreconditionError>
    where
        I: IntoIterator<Item = f64>,
    {
        if bins < 2 {
            return Err(PreconditionError::InvalidConfig(format!(
                "bins must be at least 2, got {}",
                bins
            )));
        }

        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for value in values {
            min = min.min(value);
            max = max.max(value);
        }
        if !min.is_finite() || !max.is_finite() {
            return Err(PreconditionError::EmptyValueMapping);
        }
        if min == max {
            min -= 0.5;
            max += 0.5;
        }

        let step = (max - min) / bins as f64;
        let mut edges: Vec<f64> = (0..bins).map(|i| min + step * i as f64).collect();
        edges.push(max);

        let colors = color_brewer(scheme, bins)
            .ok_or_else(|| PreconditionError::InvalidConfig(format!("unknown color scheme '{}'", scheme)))?;

        Ok(ColorScale { edges, colors })
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn min(&self) -> f64 {
        self.edges[0]
    }

    pub fn max(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Index of the colour used for `value`
    pub fn index_for(&self, value: f64) -> usize {
        // digitize(value, edges, right=False) - 1, with the top edge closed
        let above = self.edges.partition_point(|edge| *edge <= value);
        above.saturating_sub(1).min(self.colors.len() - 1)
    }

    pub fn color_for(&self, value: f64) -> &str {
        &self.colors[self.index_for(value)]
    }

    /// Legend steps as `(lower, upper, colour)`, one per bin
    pub fn steps(&self) -> Vec<(f64, f64, &str)> {
        self.edges
            .windows(2)
            .zip(&self.colors)
            .map(|(pair, color)| (pair[0], pair[1], color.as_str()))
            .collect()
    }
}
