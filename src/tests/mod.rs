pub mod common;

mod cache_policy;
mod http_surface;
