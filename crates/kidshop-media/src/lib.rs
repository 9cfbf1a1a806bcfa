//! Image hosting for catalog and storefront media.
//!
//! Files are pushed to Cloudinary with a signed upload and the returned
//! `secure_url` is what the rest of the system stores.

pub mod client;
pub mod error;

pub use client::{sign_params, CloudinaryClient, CLOUDINARY_API_BASE};
pub use error::MediaError;
