//! Media plumbing for the relay: per-request scratch files and PDF page
//! rasterization.

pub mod error;
pub mod pdf;
pub mod scratch;

pub use {
    error::{Error, Result},
    pdf::{PdfRasterizer, PdfiumRasterizer},
    scratch::{Scratch, remove_quietly},
};
