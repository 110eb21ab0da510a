//! Rectangles used for screen, window and damage geometry

/// Window geometry
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// One past the right-most column covered by this rectangle
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// One past the bottom-most row covered by this rectangle
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// The smallest rectangle containing both `self` and `other`
    pub fn union(&self, other: &Geometry) -> Geometry {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        Geometry {
            x,
            y,
            width: (right - x as i64) as u32,
            height: (bottom - y as i64) as u32,
        }
    }

    /// Grow `self` in place to cover `other` as well
    pub fn union_with(&mut self, other: &Geometry) {
        *self = self.union(other);
    }

    /// Shift the origin of this rectangle by (dx, dy)
    pub fn translate(&self, dx: i32, dy: i32) -> Geometry {
        Geometry {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
