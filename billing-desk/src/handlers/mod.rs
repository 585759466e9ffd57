pub mod app;
pub mod bills;
