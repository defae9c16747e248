#![allow(dead_code)]
use scim_updater::Lenses;

#[derive(Lenses)]
enum Status {
    Active,
    Suspended,
}

fn main() {}
