pub mod balance;
pub mod errors;
pub mod models;
pub mod services;
pub mod settle;
pub mod split;
