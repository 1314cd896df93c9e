pub mod replace;

pub use replace::ReplaceCommand;
