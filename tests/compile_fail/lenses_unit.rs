#![allow(dead_code)]
use scim_updater::Lenses;

#[derive(Lenses)]
struct Marker;

fn main() {}
