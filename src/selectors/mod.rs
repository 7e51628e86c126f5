//! Selector codecs and shape drawing for rectangular regions.

mod rect_fragment;
mod shape;

pub use rect_fragment::{
    FragmentUnit, MEDIA_FRAGS_SPEC, draw_rect_for, parse_rect_fragment, rect_area,
    to_rect_fragment,
};
pub use shape::{
    INNER_CLASS, MASK_CLASS, OUTER_CLASS, RectElement, RectGroup, RectMask, draw_rect,
    draw_rect_mask, get_rect_size, set_rect_mask_size, set_rect_size,
};
