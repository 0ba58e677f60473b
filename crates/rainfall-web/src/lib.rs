//! HTTP surface for the rain predictor
//!
//! `GET /` serves the entry form, `POST /predict` runs the submitted
//! measurements through the loaded artifacts and answers with a result page
//! or a plain-text error.

pub mod pages;
pub mod routes;
pub mod server;

pub use pages::Pages;
pub use routes::routes;
pub use server::serve;
