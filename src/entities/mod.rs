pub mod prelude;

pub mod guest_recipes;
