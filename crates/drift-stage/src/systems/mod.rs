pub mod backdrop;
pub mod boot;
pub mod choice;
pub mod composer;
pub mod letter;
pub mod nickname;
pub mod transition;
pub mod unlock;
