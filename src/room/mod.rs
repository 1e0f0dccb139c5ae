pub mod data;
pub mod terrain;
pub mod utility;
