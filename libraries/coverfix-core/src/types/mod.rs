//! Domain types shared by every coverfix crate

mod audio;
mod picture;

pub use audio::{AudioFile, AudioFormat};
pub use picture::{extension_for_mime, PictureRecord};
