//! Terminal map for choosing a location.
//!
//! The picker shows a grid viewport around its center. Each cell stands for a
//! patch of the map; clicking a cell moves the marker there and reports the
//! cell's center coordinate to the owner through the `on_select` callback.

use serde::{Deserialize, Serialize};
use std::{f64::consts::PI, fmt::Write as _};

use crate::error::InputError;

/// Latitude limit of the Web-Mercator projection used by map tiles.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

pub const DEFAULT_ZOOM: u8 = 6;
/// Deepest zoom OpenStreetMap serves tiles for.
pub const MAX_ZOOM: u8 = 19;
pub const DEFAULT_ROWS: usize = 9;
pub const DEFAULT_COLS: usize = 17;

/// Map columns covered by one 256px tile.
const COLS_PER_TILE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Coordinate inside the map's valid range: latitude clamped, longitude wrapped.
    pub fn clamped(lat: f64, lon: f64) -> Self {
        let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
        let lon = if (-180.0..=180.0).contains(&lon) {
            lon
        } else {
            (lon + 180.0).rem_euclid(360.0) - 180.0
        };
        Self { lat, lon }
    }

    pub fn parse(lat: &str, lon: &str) -> Result<Self, InputError> {
        Ok(Self::new(parse_axis("latitude", lat)?, parse_axis("longitude", lon)?))
    }
}

fn parse_axis(axis: &'static str, value: &str) -> Result<f64, InputError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InputError::InvalidCoordinate { axis, value: value.to_string() })
}

/// Slippy-map tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    /// Tile under `coord`. Zoom levels past [`MAX_ZOOM`] are capped.
    pub fn containing(coord: Coordinate, zoom: u8) -> Self {
        let zoom = zoom.min(MAX_ZOOM);
        let n = f64::from(1u32 << zoom);
        let c = Coordinate::clamped(coord.lat, coord.lon);
        let lat_rad = c.lat.to_radians();

        let x = ((c.lon + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();

        let max = n - 1.0;
        Self {
            z: zoom,
            x: x.clamp(0.0, max) as u32,
            y: y.clamp(0.0, max) as u32,
        }
    }

    pub fn url(&self) -> String {
        format!("https://tile.openstreetmap.org/{}/{}/{}.png", self.z, self.x, self.y)
    }
}

pub struct LocationPicker<F> {
    center: Coordinate,
    marker: Coordinate,
    zoom: u8,
    rows: usize,
    cols: usize,
    on_select: F,
}

impl<F> LocationPicker<F>
where
    F: FnMut(Coordinate),
{
    pub fn new(center: Coordinate, on_select: F) -> Self {
        let center = Coordinate::clamped(center.lat, center.lon);
        Self {
            center,
            marker: center,
            zoom: DEFAULT_ZOOM,
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            on_select,
        }
    }

    /// Picker centered on coordinates typed into the form.
    pub fn from_strings(lat: &str, lon: &str, on_select: F) -> Result<Self, InputError> {
        Ok(Self::new(Coordinate::parse(lat, lon)?, on_select))
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom.min(MAX_ZOOM);
        self
    }

    /// Viewport size in cells; at least one row and one column, at most 26 rows.
    pub fn with_viewport(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows.clamp(1, 26);
        self.cols = cols.max(1);
        self
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn marker(&self) -> Coordinate {
        self.marker
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn center_tile(&self) -> TileId {
        TileId::containing(self.center, self.zoom)
    }

    /// Moves the marker and reports the point to the owner.
    pub fn click(&mut self, lat: f64, lon: f64) -> Coordinate {
        let point = Coordinate::clamped(lat, lon);
        self.marker = point;
        (self.on_select)(point);
        point
    }

    /// Clicks the center of a cell such as `C7` (row letter, 1-based column).
    pub fn click_cell(&mut self, cell: &str) -> Result<Coordinate, InputError> {
        let (row, col) = self.parse_cell(cell)?;
        let point = self.cell_center(row, col);
        Ok(self.click(point.lat, point.lon))
    }

    fn deg_per_col(&self) -> f64 {
        360.0 / f64::from(1u32 << self.zoom) / COLS_PER_TILE
    }

    // Terminal cells are roughly twice as tall as they are wide.
    fn deg_per_row(&self) -> f64 {
        self.deg_per_col() * 2.0
    }

    fn mid_row(&self) -> f64 {
        (self.rows as f64 - 1.0) / 2.0
    }

    fn mid_col(&self) -> f64 {
        (self.cols as f64 - 1.0) / 2.0
    }

    fn cell_center(&self, row: usize, col: usize) -> Coordinate {
        let lat = self.center.lat + (self.mid_row() - row as f64) * self.deg_per_row();
        let lon = self.center.lon + (col as f64 - self.mid_col()) * self.deg_per_col();
        Coordinate::clamped(lat, lon)
    }

    fn cell_of(&self, point: Coordinate) -> Option<(usize, usize)> {
        let row = (self.mid_row() - (point.lat - self.center.lat) / self.deg_per_row()).round();
        let col = ((point.lon - self.center.lon) / self.deg_per_col() + self.mid_col()).round();

        let in_rows = row >= 0.0 && row < self.rows as f64;
        let in_cols = col >= 0.0 && col < self.cols as f64;
        (in_rows && in_cols).then_some((row as usize, col as usize))
    }

    fn parse_cell(&self, cell: &str) -> Result<(usize, usize), InputError> {
        let invalid = || InputError::InvalidCell(cell.to_string());
        let cell = cell.trim();

        let mut chars = cell.chars();
        let letter = chars.next().filter(|c| c.is_ascii_alphabetic()).ok_or_else(invalid)?;
        let row = (letter.to_ascii_uppercase() as u8 - b'A') as usize;
        let col: usize = chars.as_str().parse().map_err(|_| invalid())?;

        if row >= self.rows || col == 0 || col > self.cols {
            return Err(invalid());
        }

        Ok((row, col - 1))
    }

    /// ASCII rendering of the viewport: `+` marks the center, `●` the marker.
    pub fn render(&self) -> String {
        let marker = self.cell_of(self.marker);
        let center = self.cell_of(self.center);

        let mut out = String::from("   ");
        for col in 1..=self.cols {
            let _ = write!(out, "{col:>3}");
        }
        out.push('\n');

        for row in 0..self.rows {
            let _ = write!(out, " {} ", (b'A' + row as u8) as char);
            for col in 0..self.cols {
                let glyph = if marker == Some((row, col)) {
                    "●"
                } else if center == Some((row, col)) {
                    "+"
                } else {
                    "·"
                };
                let _ = write!(out, "  {glyph}");
            }
            out.push('\n');
        }

        let tile = self.center_tile();
        let _ = write!(
            out,
            "center {:.2}, {:.2} · zoom {} · tile {}/{}/{}",
            self.center.lat, self.center.lon, self.zoom, tile.z, tile.x, tile.y
        );

        out
    }
}
