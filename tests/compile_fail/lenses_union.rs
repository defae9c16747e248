#![allow(dead_code)]
use scim_updater::Lenses;

#[derive(Lenses)]
union Bits {
    raw: u32,
    real: f32,
}

fn main() {}
