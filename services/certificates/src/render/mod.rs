pub mod pdf;
pub mod qr;
pub mod theme;
