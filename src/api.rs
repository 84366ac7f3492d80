pub mod openei;

pub use self::openei::{Api as OpenEi, UtilityRate};
