//! Tile geometry used to turn a drop coordinate into an insertion index.
//!
//! Coordinates are in a column's content space: origin at the top-left of
//! the first tile's container, y growing downwards, scroll offset already
//! removed by the front end.

use serde::Deserialize;

/// A pointer position in column content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned display bounds of one page tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top/left edges are inside, bottom/right edges are not.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    /// Centre of the rectangle.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Placement of page tiles inside a column.
pub trait PageLayout {
    /// Display bounds of the tile at `index`.
    ///
    /// Must be defined for every index, including ones past the end of the
    /// column, so front ends can aim "below the last page".
    fn bounds(&self, index: usize) -> Rect;

    /// A point that lands on the tile at `index`.
    fn anchor(&self, index: usize) -> Point {
        self.bounds(index).center()
    }
}

/// Tiles stacked top to bottom with uniform size, spacing and margin.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct StackLayout {
    /// Tile width.
    pub tile_width: f32,
    /// Tile height.
    pub tile_height: f32,
    /// Vertical gap between consecutive tiles.
    pub spacing: f32,
    /// Inset of the first tile from the container's top-left corner.
    pub margin: f32,
}

impl Default for StackLayout {
    fn default() -> Self {
        Self {
            tile_width: 220.0,
            tile_height: 330.0,
            spacing: 6.0,
            margin: 9.0,
        }
    }
}

impl PageLayout for StackLayout {
    fn bounds(&self, index: usize) -> Rect {
        let y = self.margin + index as f32 * (self.tile_height + self.spacing);
        Rect::new(self.margin, y, self.tile_width, self.tile_height)
    }
}
