//! The type lattice (spec.md §3 "Types", §4.1).

mod ad_level;
mod block_origin;
mod conv;
mod sized_type;
mod unsized_type;

pub use ad_level::AdLevel;
pub use block_origin::BlockOrigin;
pub use conv::{compatible_arguments_mod_conv, contains_int, return_type_assignable, same_type_mod_array_conv, same_type_mod_conv};
pub use sized_type::SizedType;
pub use unsized_type::{FunType, ReturnType, UnsizedType};
