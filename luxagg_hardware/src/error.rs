use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("light sensor not activated")]
    NotActivated,
    #[error("adc reading {raw} outside 0..{full_scale}")]
    AdcOutOfRange { raw: u32, full_scale: u32 },
    #[error("invalid photodiode parameters: {0}")]
    InvalidParams(&'static str),
    #[error("replay source exhausted after {0} readings")]
    Exhausted(usize),
}

pub type Result<T> = std::result::Result<T, HwError>;
