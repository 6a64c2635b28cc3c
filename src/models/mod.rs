pub mod invoice;
pub mod payment;

pub use invoice::*;
pub use payment::*;
