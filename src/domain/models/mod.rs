pub mod auth;
pub mod detail;
pub mod event;
pub mod friendship;
pub mod game;
pub mod participant;
pub mod user;
