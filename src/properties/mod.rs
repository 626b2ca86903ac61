pub(crate) mod properties_errors;
pub(crate) mod properties_model;
pub(crate) mod properties_repository;
pub(crate) mod properties_traits;

pub use properties_errors::PropertyError;
pub use properties_model::{
    Candle, CandleDB, NewProperty, Property, PropertyCategory, PropertyDB, ShareInventory,
};
pub use properties_repository::PropertyRepository;
pub use properties_traits::PropertyReferenceTrait;
