pub mod highlight;
pub mod patch;
