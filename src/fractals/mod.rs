pub mod common;
pub mod mandelbrot;
pub mod newtons_method_core;
pub mod polynomial;
pub mod polynomial_newton;
pub mod quartic_newton;
pub mod root_registry;
pub mod roots_of_unity;
