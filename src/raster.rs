use std::fmt;

use cgmath::{vec2, Vector2};
use ndarray::Array2;
use thiserror::Error;

use crate::sky::Sky;

#[derive(Debug, Error)]
pub enum PlateError {
    #[error("pattern line {line}, column {column}: unexpected {ch:?}")]
    BadCell { line: usize, column: usize, ch: char },
}

/// A black-and-white star plate: lit cells on a bounding-box grid, indexed
/// `[[x, y]]` with shape (width, height).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plate {
    cells: Array2<bool>,
}

impl Plate {
    pub fn width(&self) -> usize {
        self.cells.dim().0
    }

    pub fn height(&self) -> usize {
        self.cells.dim().1
    }

    /// Raw cell grid, for renderers.
    pub fn cells(&self) -> &Array2<bool> {
        &self.cells
    }

    /// Lit cells as points.
    pub fn stars(&self) -> impl Iterator<Item = Vector2<i64>> + '_ {
        self.cells
            .indexed_iter()
            .filter(|&(_, &lit)| lit)
            .map(|((x, y), _)| vec2(x as i64, y as i64))
    }

    /// Parse a text plate: `#` is lit, `.` and space are dark, short rows
    /// are padded dark. The inverse of `Display`.
    pub fn from_text(text: &str) -> Result<Plate, PlateError> {
        let rows: Vec<&str> = text.lines().collect();
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);

        let mut cells = Array2::from_elem((width, height), false);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                match ch {
                    '#' => cells[[x, y]] = true,
                    '.' | ' ' => {}
                    _ => {
                        return Err(PlateError::BadCell {
                            line: y + 1,
                            column: x + 1,
                            ch,
                        })
                    }
                }
            }
        }

        Ok(Plate { cells })
    }
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.cells.dim();
        for y in 0..height {
            for x in 0..width {
                write!(f, "{}", if self.cells[[x, y]] { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Drop the field onto a plate sized to its per-axis bounding box: every
/// star marks the cell (x - min x, y - min y). An empty sky gives a 0x0
/// plate.
pub fn rasterize(sky: &Sky) -> Plate {
    let positions = sky.positions();

    let bound = |axis: usize| -> Option<(i64, i64)> {
        let column = positions.column(axis);
        Some((
            column.iter().copied().min()?,
            column.iter().copied().max()?,
        ))
    };

    let ((min_x, max_x), (min_y, max_y)) = match bound(0).zip(bound(1)) {
        Some(bounds) => bounds,
        None => {
            return Plate {
                cells: Array2::from_elem((0, 0), false),
            }
        }
    };

    let width = (max_x - min_x) as usize + 1;
    let height = (max_y - min_y) as usize + 1;

    let mut cells = Array2::from_elem((width, height), false);
    for star in positions.rows() {
        cells[[(star[0] - min_x) as usize, (star[1] - min_y) as usize]] = true;
    }

    Plate { cells }
}
