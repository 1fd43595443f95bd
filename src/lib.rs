// src/lib.rs — Library root for pixelscribe

pub mod cli;
pub mod core;
pub mod gateway;
pub mod image;
pub mod infra;
pub mod util;
