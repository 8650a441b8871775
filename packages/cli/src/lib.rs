//! Guest-side logic for the wedding site: file validation, adaptive
//! compression, CDN uploads, and a cached view of the wishes wall.

pub mod api;
pub mod cache;
pub mod compress;
pub mod config;
pub mod error;
pub mod upload;
pub mod wishes;
