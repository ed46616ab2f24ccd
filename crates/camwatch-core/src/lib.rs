pub mod camera;
pub mod config;
pub mod consts;
pub mod daynight;
pub mod detection;
pub mod error;
pub mod logsink;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod sun;
pub mod supervisor;
pub mod tools;
pub mod video;
