//! External service integrations.

pub mod prediction_client {
    pub use crate::prediction_client::*;
}

pub mod warmup {
    pub use crate::warmup::*;
}
