//! Conformance fixture tools named in spec.md §1 and exercised by the
//! end-to-end scenarios in §8. Not a design surface: kept deliberately
//! small and dependency-free.

mod dice;
mod fortune;
mod slow_operation;

pub use dice::RollDiceTool;
pub use fortune::FortuneTellerTool;
pub use slow_operation::SlowOperationTool;
