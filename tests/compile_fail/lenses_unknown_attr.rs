#![allow(dead_code)]
use scim_updater::Lenses;

#[derive(Lenses)]
struct Login {
    #[lenses(rename = "user")]
    username: String,
}

fn main() {}
