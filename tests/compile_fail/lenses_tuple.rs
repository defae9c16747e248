#![allow(dead_code)]
use scim_updater::Lenses;

#[derive(Lenses)]
struct Meters(u32);

fn main() {}
