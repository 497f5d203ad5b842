pub mod pbr;
pub mod shadow;
