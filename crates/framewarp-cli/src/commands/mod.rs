pub mod info;
pub mod replay;
