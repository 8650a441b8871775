pub mod best_wish;
pub mod uploaded_image;
