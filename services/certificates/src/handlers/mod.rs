pub mod certificate;
pub mod checkin;
