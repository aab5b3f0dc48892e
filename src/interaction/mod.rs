//! Interaction module - click and type by template image

mod image;

pub use image::{ClickImageOptions, Image, ImageExtension, ImageSettings};
