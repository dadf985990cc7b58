mod card;
mod deck;
mod message;
mod state;
mod user;

pub use card::{Card, NewCard};
pub use deck::{Deck, DeckWithStats, NewDeck};
pub use message::{Message, MessageList};
pub use state::{State, StateData};
pub use user::{NewUser, User};
