// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod l2;
pub mod model;
pub mod normal;
pub mod stats;

pub use l2::BlockL2Cost;
pub use model::CostFunction;
pub use normal::BlockNormalCost;
pub use stats::PrefixStats;
