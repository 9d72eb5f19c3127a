#[allow(clippy::cast_possible_truncation)]
pub mod image;
pub mod io_device;
