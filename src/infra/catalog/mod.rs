pub mod bgg_service;
