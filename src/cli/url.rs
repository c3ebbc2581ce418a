use crate::{config::Config, utils};

/// Prints the authorize URL instead of navigating to it.
pub fn url(config: &Config) {
    println!("{}", utils::build_authorize_url(config));
}
