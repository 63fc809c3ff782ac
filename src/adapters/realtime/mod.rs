//! Realtime adapter module. Implements RealtimeFeed.

pub mod channel_feed;

pub use channel_feed::ChannelFeed;
