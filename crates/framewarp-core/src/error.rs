use thiserror::Error;

#[derive(Error, Debug)]
pub enum FramewarpError {
    #[error("Invalid argument: {what}")]
    InvalidArgument { what: &'static str },

    #[error("Warp engine call {call} failed with status {status}")]
    Engine { call: &'static str, status: i32 },

    #[error("Unsupported grid geometry: {geometry}")]
    InvalidGeometry { geometry: u32 },
}

pub type Result<T> = std::result::Result<T, FramewarpError>;
