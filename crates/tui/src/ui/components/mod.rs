pub mod card;
pub mod confirm;
pub mod money;
pub mod tabs;
pub mod toast;
