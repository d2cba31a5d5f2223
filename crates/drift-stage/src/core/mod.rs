pub mod scene;
pub mod session;
pub mod time;
pub mod timeline;
