pub mod conversions;
pub mod serialization;
pub mod u256_ext;
pub mod wad;
