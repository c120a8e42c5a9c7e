//! # Bitmap to Layout
//!
//! Builds a [`GdsLibrary`] with a three-level hierarchy from a binary
//! bitmap:
//!
//! ```text
//! TOP ── 1 × SREF GRID, magnification = cell size (µm)
//!  └─ GRID ── 1 × SREF CELL per black pixel, integer origins
//!      └─ CELL ── unit square (0,0)–(1,1) on the configured layer
//! ```
//!
//! Units are 1 µm per user unit and 1 nm per database unit, so one unit
//! square is 1000 database units wide.
//!
//! ## Orientation
//!
//! Bitmap rows grow downward, layout y grows upward. Pixel `(x, y)` is
//! placed at `(x, height − y − 1)`, so the layout reads the same way as
//! the image.
//!
//! ## Reference Order
//!
//! Columns left to right; within a column, rows top to bottom of the image
//! (layout y descending). The order does not change the geometry but it is
//! the order of SREF records in the file.
//!
//! ## Example
//!
//! ```
//! use pixgds::layout::{LayoutParams, emit_layout, encode_layout, read_layout};
//! use pixgds::render::bitmap::{BinaryBitmap, Pixel};
//!
//! let bitmap = BinaryBitmap::new(2, 2, Pixel::Black);
//! let library = emit_layout(&bitmap, &LayoutParams::default()).unwrap();
//! let bytes = encode_layout(&library).unwrap();
//!
//! let parsed = read_layout(bytes).unwrap();
//! assert_eq!(parsed.structs.len(), 3);
//! assert_eq!(parsed.structs[1].elems.len(), 4);
//! ```

use std::path::Path;

use chrono::{Local, NaiveDateTime};
use gds21::{
    GdsBoundary, GdsDateTimes, GdsElement, GdsLibrary, GdsPoint, GdsStrans, GdsStruct,
    GdsStructRef, GdsUnits,
};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::render::bitmap::BinaryBitmap;

/// Name of the unit-square cell.
pub const UNIT_CELL: &str = "CELL";
/// Name of the cell holding one reference per black pixel.
pub const GRID_CELL: &str = "GRID";
/// Name of the magnified root cell.
pub const TOP_CELL: &str = "TOP";

/// Stream format version written to the HEADER record.
pub const STREAM_VERSION: i16 = 600;

/// Database units per user unit.
const DB_PER_UM: i32 = 1000;

/// 1 µm user unit, 1 nm database unit.
fn micron_units() -> GdsUnits {
    GdsUnits::new(1e-3, 1e-9)
}

/// Parameters for [`emit_layout`].
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    pub layer: i16,
    pub datatype: i16,
    /// Magnification of the GRID reference in TOP.
    pub cell_size_um: f64,
    pub library_name: String,
    /// `None` uses the current local time.
    pub timestamp: Option<NaiveDateTime>,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            layer: 4,
            datatype: 0,
            cell_size_um: 2.0,
            library_name: "LIBRARY".to_string(),
            timestamp: None,
        }
    }
}

/// Scale a user-unit grid coordinate to database units.
fn to_db(value: u32) -> Result<i32> {
    i32::try_from(value)
        .ok()
        .and_then(|v| v.checked_mul(DB_PER_UM))
        .ok_or_else(|| {
            Error::invalid(
                "coordinate",
                format!("{} does not fit in a 32-bit database coordinate", value),
            )
        })
}

fn point(x: u32, y: u32) -> Result<GdsPoint> {
    Ok(GdsPoint::new(to_db(x)?, to_db(y)?))
}

fn structure(name: &str, dates: &GdsDateTimes, elems: Vec<GdsElement>) -> GdsStruct {
    let mut strukt = GdsStruct::new(name);
    strukt.dates = dates.clone();
    strukt.elems = elems;
    strukt
}

/// Unit square `(0,0)–(1,1)`, closed by repeating the first vertex.
fn unit_square(layer: i16, datatype: i16) -> Result<GdsElement> {
    let xy = [(0, 0), (0, 1), (1, 1), (1, 0), (0, 0)]
        .into_iter()
        .map(|(x, y)| point(x, y))
        .collect::<Result<Vec<_>>>()?;
    Ok(GdsBoundary {
        layer,
        datatype,
        xy,
        ..Default::default()
    }
    .into())
}

/// Uniform magnification; `None` when it is 1 so no STRANS is written.
fn magnification(mag: f64) -> Option<GdsStrans> {
    (mag != 1.0).then(|| GdsStrans {
        mag: Some(mag),
        ..Default::default()
    })
}

/// Build the layout library for a bitmap.
///
/// A bitmap without black pixels still yields all three cells; GRID is
/// simply empty.
pub fn emit_layout(bitmap: &BinaryBitmap, params: &LayoutParams) -> Result<GdsLibrary> {
    let (width, height) = bitmap.dimensions();
    let timestamp = params
        .timestamp
        .unwrap_or_else(|| Local::now().naive_local());
    let dates = GdsDateTimes {
        modified: timestamp,
        accessed: timestamp,
    };

    let mut references = Vec::new();
    for x in 0..width {
        for y in 0..height {
            if bitmap.is_black(x, y) {
                references.push(
                    GdsStructRef {
                        name: UNIT_CELL.to_string(),
                        xy: point(x, height - y - 1)?,
                        ..Default::default()
                    }
                    .into(),
                );
            }
        }
    }

    if references.is_empty() {
        warn!("No black pixels; writing a layout without geometry");
    } else {
        info!(references = references.len(), "Placed unit cells");
    }

    let top = GdsStructRef {
        name: GRID_CELL.to_string(),
        xy: GdsPoint::new(0, 0),
        strans: magnification(params.cell_size_um),
        ..Default::default()
    };

    let mut library = GdsLibrary::new(params.library_name.as_str());
    library.version = STREAM_VERSION;
    library.units = micron_units();
    library.dates = dates.clone();
    library.structs = vec![
        structure(
            UNIT_CELL,
            &dates,
            vec![unit_square(params.layer, params.datatype)?],
        ),
        structure(GRID_CELL, &dates, references),
        structure(TOP_CELL, &dates, vec![top.into()]),
    ];
    Ok(library)
}

/// Serialize a library to GDSII stream bytes.
pub fn encode_layout(library: &GdsLibrary) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    library
        .write(&mut bytes)
        .map_err(|e| Error::Encode(format!("Failed to write GDSII stream: {:?}", e)))?;
    debug!(bytes = bytes.len(), "Encoded layout");
    Ok(bytes)
}

/// Parse GDSII stream bytes.
pub fn read_layout(bytes: Vec<u8>) -> Result<GdsLibrary> {
    GdsLibrary::from_bytes(bytes).map_err(|e| Error::Decode {
        source_name: "GDSII stream".to_string(),
        reason: format!("{:?}", e),
    })
}

/// Read and parse a GDSII file.
pub fn open_layout(path: &Path) -> Result<GdsLibrary> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    read_layout(bytes).map_err(|e| match e {
        Error::Decode { reason, .. } => Error::Decode {
            source_name: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// References in a structure, in file order.
pub fn references(strukt: &GdsStruct) -> impl Iterator<Item = &GdsStructRef> {
    strukt.elems.iter().filter_map(|e| match e {
        GdsElement::GdsStructRef(r) => Some(r),
        _ => None,
    })
}

/// Boundaries in a structure, in file order.
pub fn boundaries(strukt: &GdsStruct) -> impl Iterator<Item = &GdsBoundary> {
    strukt.elems.iter().filter_map(|e| match e {
        GdsElement::GdsBoundary(b) => Some(b),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::bitmap::Pixel;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn params() -> LayoutParams {
        LayoutParams {
            timestamp: NaiveDate::from_ymd_opt(2025, 6, 1).and_then(|d| d.and_hms_opt(12, 0, 0)),
            ..Default::default()
        }
    }

    fn cell<'a>(library: &'a GdsLibrary, name: &str) -> &'a GdsStruct {
        library
            .structs
            .iter()
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("missing structure {}", name))
    }

    fn origins(library: &GdsLibrary) -> Vec<(i32, i32)> {
        references(cell(library, GRID_CELL))
            .map(|r| (r.xy.x, r.xy.y))
            .collect()
    }

    fn round_trip(library: &GdsLibrary) -> GdsLibrary {
        read_layout(encode_layout(library).unwrap()).unwrap()
    }

    #[test]
    fn test_three_cells_in_order() {
        let bitmap = BinaryBitmap::new(2, 2, Pixel::Black);
        let library = emit_layout(&bitmap, &params()).unwrap();
        let names: Vec<&str> = library.structs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["CELL", "GRID", "TOP"]);
        assert_eq!(library.name, "LIBRARY");
        assert_eq!(library.version, STREAM_VERSION);
    }

    #[test]
    fn test_vertical_flip_and_order() {
        // Black at (0,0), (0,1) and (2,1) of a 3×2 image.
        let bitmap = BinaryBitmap::from_fn(3, 2, |x, y| {
            if (x, y) == (0, 0) || (x, y) == (2, 1) || (x, y) == (0, 1) {
                Pixel::Black
            } else {
                Pixel::White
            }
        });
        let library = emit_layout(&bitmap, &params()).unwrap();
        assert_eq!(origins(&library), vec![(0, 1000), (0, 0), (2000, 0)]);
    }

    #[test]
    fn test_one_reference_per_black_pixel() {
        let bitmap = BinaryBitmap::from_fn(7, 5, |x, y| {
            if (x * y + x) % 3 == 0 {
                Pixel::Black
            } else {
                Pixel::White
            }
        });
        let library = emit_layout(&bitmap, &params()).unwrap();
        let placed = origins(&library);
        assert_eq!(placed.len(), bitmap.count_black());
        for (ox, oy) in placed {
            let x = (ox / 1000) as u32;
            let y = 5 - 1 - (oy / 1000) as u32;
            assert!(bitmap.is_black(x, y), "({}, {}) should be black", x, y);
        }
        assert!(
            references(cell(&library, GRID_CELL))
                .all(|r| r.name == UNIT_CELL && r.strans.is_none())
        );
    }

    #[test]
    fn test_unit_square_is_closed() {
        let bitmap = BinaryBitmap::new(1, 1, Pixel::Black);
        let params = LayoutParams {
            layer: 17,
            datatype: 3,
            ..params()
        };
        let library = round_trip(&emit_layout(&bitmap, &params).unwrap());

        let squares: Vec<&GdsBoundary> = boundaries(cell(&library, UNIT_CELL)).collect();
        assert_eq!(squares.len(), 1);
        assert_eq!(squares[0].layer, 17);
        assert_eq!(squares[0].datatype, 3);
        let xy: Vec<(i32, i32)> = squares[0].xy.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(xy, vec![(0, 0), (0, 1000), (1000, 1000), (1000, 0), (0, 0)]);
    }

    #[test]
    fn test_top_magnification_survives_encoding() {
        let bitmap = BinaryBitmap::new(1, 1, Pixel::Black);
        let params = LayoutParams {
            cell_size_um: 0.35,
            ..params()
        };
        let library = round_trip(&emit_layout(&bitmap, &params).unwrap());

        let refs: Vec<&GdsStructRef> = references(cell(&library, TOP_CELL)).collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, GRID_CELL);
        assert_eq!((refs[0].xy.x, refs[0].xy.y), (0, 0));
        let mag = refs[0].strans.as_ref().and_then(|s| s.mag).unwrap();
        assert!((mag - 0.35).abs() < 1e-12, "mag {}", mag);
    }

    #[test]
    fn test_unit_magnification_omits_strans() {
        let bitmap = BinaryBitmap::new(1, 1, Pixel::Black);
        let params = LayoutParams {
            cell_size_um: 1.0,
            ..params()
        };
        let library = round_trip(&emit_layout(&bitmap, &params).unwrap());
        let top = references(cell(&library, TOP_CELL)).next().unwrap();
        assert!(top.strans.is_none());
    }

    #[test]
    fn test_units_and_timestamp() {
        let bitmap = BinaryBitmap::new(1, 1, Pixel::White);
        let params = params();
        let library = round_trip(&emit_layout(&bitmap, &params).unwrap());
        assert!((library.units.db_unit() - 1e-9).abs() < 1e-20);
        let expected = params.timestamp.unwrap();
        assert_eq!(library.dates.modified, expected);
        assert!(library.structs.iter().all(|s| s.dates.modified == expected));
    }

    #[test]
    fn test_all_white_gives_empty_grid() {
        let bitmap = BinaryBitmap::new(2, 2, Pixel::White);
        let library = round_trip(&emit_layout(&bitmap, &params()).unwrap());
        assert!(origins(&library).is_empty());
        assert_eq!(references(cell(&library, TOP_CELL)).count(), 1);
    }

    #[test]
    fn test_coordinate_overflow_rejected() {
        assert_eq!(to_db(2_147_483).unwrap(), 2_147_483_000);
        assert!(matches!(
            to_db(2_147_484),
            Err(Error::InvalidParameter { name: "coordinate", .. })
        ));
    }
}
