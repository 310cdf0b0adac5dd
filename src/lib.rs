pub mod adapters;
pub mod chemistry;
pub mod error;
pub mod models;
pub mod speciation;

pub use crate::adapters::teos10::{kg_per_litre, sa_from_sp};
pub use crate::error::{AppError, ElementFault};
pub use crate::models::{Assumptions, EquilibriumConstants, Inputs, KsSeries, Series};
pub use crate::speciation::dispatch::{Parameter, ParameterPair, SolverKind};
pub use crate::speciation::isotopes::{IsotopeSet, h_from_boron_isotopes};
pub use crate::speciation::system::{CarbonateState, Speciation, speciate};
pub use crate::speciation::zero::{Diagnostic, HSolution, SolveStatus, SolverConfig};
