pub mod facility;
pub mod form;
pub mod intake;
pub mod presentation;
pub mod submission;
