pub mod lifecycle;
pub mod notifications;
pub mod recommendations;
pub mod rsvp;
pub mod votes;
