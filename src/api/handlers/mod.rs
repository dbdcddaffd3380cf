pub mod dispatch;
pub mod files;
pub mod health;
pub mod output;
pub mod page;
pub mod selection;
