mod admin;
mod auth;
mod courses;
