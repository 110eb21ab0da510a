//! Hints Module
//!
//! ICCCM window hints (WM_NORMAL_HINTS and WM_HINTS) decoded from their raw
//! 32-bit property values, and the size constraints they imply.

use crate::shared::Geometry;

const P_MIN_SIZE: u32 = 1 << 4;
const P_MAX_SIZE: u32 = 1 << 5;
const P_RESIZE_INC: u32 = 1 << 6;
const P_BASE_SIZE: u32 = 1 << 8;

const INPUT_HINT: u32 = 1 << 0;

/// Size hints (XSizeHints equivalent)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SizeHints {
    pub flags: u32,
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub width_inc: u32,
    pub height_inc: u32,
    pub base_width: u32,
    pub base_height: u32,
}

impl SizeHints {
    /// Decode the 18 values of a WM_NORMAL_HINTS property
    pub fn from_raw(values: &[u32]) -> Option<Self> {
        if values.len() < 18 {
            return None;
        }

        Some(Self {
            flags: values[0],
            min_width: values[5],
            min_height: values[6],
            max_width: values[7],
            max_height: values[8],
            width_inc: values[9],
            height_inc: values[10],
            base_width: values[15],
            base_height: values[16],
        })
    }

    /// Clamp `geometry` to the min/max sizes and snap it to the resize increments
    pub fn apply_to(&self, geometry: &Geometry) -> Geometry {
        let mut g = *geometry;

        if self.flags & P_MIN_SIZE != 0 {
            g.width = g.width.max(self.min_width);
            g.height = g.height.max(self.min_height);
        }

        if self.flags & P_MAX_SIZE != 0 {
            if self.max_width > 0 {
                g.width = g.width.min(self.max_width);
            }
            if self.max_height > 0 {
                g.height = g.height.min(self.max_height);
            }
        }

        if self.flags & P_RESIZE_INC != 0 {
            let (bw, bh) = if self.flags & P_BASE_SIZE != 0 {
                (self.base_width, self.base_height)
            } else {
                (0, 0)
            };
            if self.width_inc > 0 && g.width > bw {
                g.width = bw + (g.width - bw) / self.width_inc * self.width_inc;
            }
            if self.height_inc > 0 && g.height > bh {
                g.height = bh + (g.height - bh) / self.height_inc * self.height_inc;
            }
        }

        g
    }
}

/// WM hints (XWMHints equivalent)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WmHints {
    pub flags: u32,
    pub input: bool,
}

impl WmHints {
    /// Decode a WM_HINTS property (at least the flags and input fields)
    pub fn from_raw(values: &[u32]) -> Option<Self> {
        match values {
            [flags, input, ..] => Some(Self {
                flags: *flags,
                input: *input != 0,
            }),
            _ => None,
        }
    }

    /// Whether the client wants keyboard focus from the window manager.
    /// Without an input hint the answer is yes.
    pub fn accepts_input(&self) -> bool {
        self.flags & INPUT_HINT == 0 || self.input
    }
}
