mod details;
mod panels;
pub(super) mod search;
