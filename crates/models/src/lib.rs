pub mod coffee_bean;
pub mod db;
pub mod errors;
pub mod review;
pub mod shop;
pub mod user;
pub mod user_credentials;
