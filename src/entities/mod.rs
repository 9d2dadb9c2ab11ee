pub mod director;
pub mod genre;
pub mod known_for_movie;
pub mod movie;
pub mod person;
pub mod principal;
pub mod profession;
pub mod rating;
pub mod writer;
