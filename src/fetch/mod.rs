mod command;
mod trigger;
mod validate;

pub use command::FetchCommand;
pub use trigger::{CommandFetcher, FetchTrigger, store_payload};
pub use validate::PredatorName;
