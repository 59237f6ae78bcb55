pub mod giving;
pub mod notify;
pub mod pledges;
pub mod ports;
pub mod sacraments;
