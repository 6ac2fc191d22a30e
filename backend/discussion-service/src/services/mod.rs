pub mod discussion;

pub use discussion::DiscussionService;
