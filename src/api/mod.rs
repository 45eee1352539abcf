//! Remote scheduling API: the authoritative owner of every entity.

mod api_types;
mod client;
mod remote;

pub use api_types::ApiScheduleViewRow;
pub use client::HttpRemote;
pub use remote::RemoteApi;
