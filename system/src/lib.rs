pub extern crate rand;
pub extern crate serde;
pub extern crate serde_json;

mod coordinator;
mod message;
mod presence;
mod timeline;

pub use coordinator::*;
pub use message::*;
pub use presence::*;
pub use timeline::*;
