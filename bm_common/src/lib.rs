mod bonus;
mod helpers;

pub mod op;
mod secret;

pub use bonus::{Bonus, BonusConversionError};
pub use helpers::{is_valid_luhn, parse_boolean_flag};
pub use secret::Secret;
