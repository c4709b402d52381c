pub mod composer;
pub mod expression;
pub mod spec;

pub use composer::LayerComposer;
pub use expression::Expression;
pub use spec::{LayerKind, LayerPosition, LayerSpec, SourceKind, SourceSpec};
