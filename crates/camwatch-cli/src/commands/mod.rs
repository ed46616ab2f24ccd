pub mod capture;
pub mod config;
pub mod status;
pub mod stop;
pub mod video;
