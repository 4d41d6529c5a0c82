pub mod cursor;
pub mod hash;
pub mod write;
