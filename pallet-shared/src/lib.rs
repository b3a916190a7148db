pub mod carriers;
pub mod pii;

pub use carriers::CarrierDirectory;
pub use pii::Masked;
