pub mod ray;
pub mod vec2;
pub mod vec3;
