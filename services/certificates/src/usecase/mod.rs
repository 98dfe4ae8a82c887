pub mod checkin;
pub mod issue;
pub mod sign;
pub mod verify;
