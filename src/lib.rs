pub mod batch;
pub mod cggtts;
pub mod decoder;
pub mod filename_meta;
pub mod sheet;
