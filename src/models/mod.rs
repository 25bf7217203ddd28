pub mod card;
pub mod deck;
pub mod owned;
pub mod price;

pub use card::*;
pub use deck::*;
pub use owned::*;
pub use price::*;
