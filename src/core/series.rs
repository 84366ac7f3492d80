mod assign;
mod resample;

pub use self::{assign::AssignRates, resample::Resample};

pub type Point<K, V> = (K, V);
pub type Series<K, V> = Vec<Point<K, V>>;
