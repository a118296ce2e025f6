mod build;
mod interaction;
mod view;

pub(in crate::app) use interaction::click_action;
