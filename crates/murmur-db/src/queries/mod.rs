mod activity;
mod comments;
mod deliveries;
mod drafts;
mod hashtags;
mod posts;
mod reactions;
mod sessions;
mod subscribers;
mod topics;
mod views;

pub use subscribers::SubscribeOutcome;
