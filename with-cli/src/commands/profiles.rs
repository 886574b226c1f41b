//! Profiles command implementation

use anyhow::Result;
use with_namespace::ConfigLoader;

use super::build::load_profiles;

pub fn execute() -> Result<i32> {
    let profiles = load_profiles(&ConfigLoader::from_env());

    for name in profiles.names() {
        println!("{name}");
    }

    Ok(0)
}
