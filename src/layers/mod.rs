pub mod dense;
pub mod gradients;
pub mod initialization;

pub use dense::Layer;
pub use gradients::{LayerGradients, LayerOutput};
pub use initialization::WeightInit;
