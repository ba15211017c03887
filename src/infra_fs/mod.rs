mod photo_store_fs;

pub use photo_store_fs::*;
