pub mod event;
pub mod image;
pub mod wish;
