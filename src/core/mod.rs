// Domain-layer modules and shared errors/models
pub mod input {
    pub use crate::input::*;
}

pub mod lifecycle {
    pub use crate::lifecycle::*;
}

pub mod risk {
    pub use crate::risk::*;
}

pub mod strategy {
    pub use crate::strategy::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
