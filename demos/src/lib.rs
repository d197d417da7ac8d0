pub mod defaults;
pub mod demo;
