pub mod activities;
pub mod admin;
pub mod auth;
pub mod home;
pub mod news;
pub mod responses;
pub mod reviews;
pub mod user;
