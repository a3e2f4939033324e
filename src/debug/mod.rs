pub mod gradient_check;

pub use gradient_check::{max_gradient_error, numerical_gradients};
