mod common;

mod event;
mod images;
mod wishes;
