pub mod bible;
pub mod email;
pub mod payments;
pub mod push;
