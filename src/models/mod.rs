//! Request and response shapes. These differ from the table rows in `db::models`
//! where the API nests, flattens or derives fields.

use serde::{Deserialize, Deserializer};

pub mod company;
pub mod product;
pub mod user;

pub use company::*;
pub use product::*;
pub use user::*;

/// Tells an absent field (`None`) from an explicit `null` (`Some(None)`), so a
/// nullable column can be cleared by an update.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
