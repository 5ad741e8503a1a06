pub use super::guest_recipes::Entity as GuestRecipes;
