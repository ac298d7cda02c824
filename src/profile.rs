mod auth;
mod env;
mod http;
mod settings;

pub use env::{Env, parse_dotenv};
pub use settings::{PollSettings, WaveSpeedSettings};

pub(crate) use auth::{HttpAuth, resolve_api_token};
pub(crate) use http::{
    build_http_client, combine_headers, header_map_from_pairs, with_user_agent_suffix,
};
