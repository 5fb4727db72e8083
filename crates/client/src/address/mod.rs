//! Address record editing and the address book.

mod book;
mod editor;

pub use book::{AddressBook, EditingAddress, Reload, pickup_candidate};
pub use editor::{AddressEdit, AddressEditor};
