pub mod cascade;
pub mod framework;
