/*

This is intended to quickly import commonly used modules across
the crate.

@date: 8 Nov, 2025
@author: bartu
*/

// Almost every module uses tracing, so I'm adding it here
pub use tracing::{info, error, warn, debug};
pub use smart_default::SmartDefault;
pub use serde::{Deserialize, Serialize};
pub use std::{sync::Arc};

pub use crate::json_parser::{*};
pub use crate::numeric::{*};
pub use crate::transform::Transform;
