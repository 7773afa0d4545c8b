pub mod catalog;
pub mod event;
pub mod friends;
pub mod health;
pub mod organizer;
pub mod profile;
pub mod rsvp;
